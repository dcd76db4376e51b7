//! Application layer for consilium
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ConsultOptions, CouncilConfig, DebateConfig, DispatchParams};
pub use ports::{
    agent_gateway::{AdapterError, AdapterOutput, AgentGateway},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{NoProgress, ProgressNotifier},
    response_cache::{CacheError, NoCache, ResponseCache},
};
pub use use_cases::consult::{ConsultError, ConsultInput, ConsultUseCase, ConsultationResult};
pub use use_cases::debate::{DebateController, DebateOutcome};
pub use use_cases::dispatch::{DispatchError, DispatchRequest, Dispatcher};
pub use use_cases::escalation::{EscalationOutcome, EscalationUseCase};
