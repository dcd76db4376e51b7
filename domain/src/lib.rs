//! Domain layer for consilium
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns, and
//! no I/O. Cache freshness and TTL arithmetic take a
//! [`Clock`](core::clock::Clock); the `timestamp` stamps on responses and
//! rounds are informational wall-clock reads and never feed a decision.
//!
//! # Core Concepts
//!
//! ## Panel
//!
//! A task is posed to several independent agents ([`AgentSpec`]). Each
//! round collects one [`AgentSlot`] per agent into a [`RoundRecord`].
//!
//! ## Consensus
//!
//! [`consensus`] groups answers by declared approach and scores agreement
//! 0–100, with confidence statistics and a confidence-weighted
//! recommendation. A [`SynthesisStrategy`] turns that into a [`Verdict`].
//!
//! ## Debate
//!
//! Optional rounds 2..K in which agents see each other's answers and
//! revise. The [`ContinuationPolicy`] decides whether another round runs.

pub mod agent;
pub mod cache;
pub mod config;
pub mod core;
pub mod debate;
pub mod prompt;
pub mod quorum;
pub mod response;
pub mod round;
pub mod routing;

// Re-export commonly used types
pub use agent::{AgentSpec, CapabilityTier};
pub use cache::{CacheEntry, CacheKey, Fingerprint};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    clock::{Clock, ManualClock, SystemClock},
    error::DomainError,
    task::Task,
};
pub use debate::{
    Continuation, ContinuationPolicy, Critique, CritiqueSeverity, DebatePhase, DebateState,
    DebateSummary, DebateTurn, RecordedCritique, StopReason,
};
pub use prompt::{PeerView, PromptTemplate};
pub use quorum::{
    ApproachGroup, ConfidenceStats, ConsensusLevel, ConsensusResult, SynthesisStrategy, Verdict,
    Vote, consensus,
};
pub use response::{
    AgentResponse, Confidence, NormalizedResponse, RawOutput, ResponseBody, ResponseMetadata,
    ResponseNormalizer,
};
pub use round::{AgentSlot, RoundRecord, SlotSource, SlotStatus};
pub use routing::{CategoryRoute, EscalationPolicy, ParticipantRouter};
