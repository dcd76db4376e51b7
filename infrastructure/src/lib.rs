//! Infrastructure layer for consilium
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod adapters;
pub mod cache;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use adapters::{CommandAgentAdapter, HttpAgentAdapter, RoutingAgentGateway};
pub use cache::{FileResponseCache, InMemoryResponseCache};
pub use config::{
    AdapterKind, CacheBackend, ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig,
    FileOutputConfig, FileOutputFormat,
};
pub use logging::JsonlConversationLogger;
