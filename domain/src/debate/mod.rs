//! Multi-round critique protocol: turn payloads, the continuation policy
//! and the debate state machine.

pub mod policy;
pub mod state;
pub mod turn;

pub use policy::{
    Continuation, ContinuationPolicy, DEFAULT_DEBATE_ROUNDS, DEFAULT_SPREAD_THRESHOLD, StopReason,
};
pub use state::{DebatePhase, DebateState, DebateSummary, RecordedCritique};
pub use turn::{Critique, CritiqueSeverity, DebateTurn};
