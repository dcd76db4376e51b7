//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`DispatchParams`]: retry pacing shared by every agent
//! - [`ConsultOptions`]: per-consultation switches (debate, cache, escalation, strategy)
//! - [`DebateConfig`]: continuation and peer-labelling settings
//! - [`CouncilConfig`]: the immutable container handed to the consult use case

pub mod consult_options;
pub mod council_config;
pub mod debate_config;
pub mod dispatch_params;

pub use consult_options::ConsultOptions;
pub use council_config::{CouncilConfig, DEFAULT_CACHE_TTL};
pub use debate_config::DebateConfig;
pub use dispatch_params::{DEFAULT_RETRY_DELAY, DispatchParams};
