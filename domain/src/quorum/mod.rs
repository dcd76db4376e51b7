//! Panel consensus
//!
//! Everything here is a pure function of a [`RoundRecord`](crate::round::RoundRecord).
//!
//! ```text
//! RoundRecord ──► Vote per answered slot
//!                   │
//!                   ▼
//!              ApproachGroup tally ──► score / level
//!                   │                   confidence stats
//!                   ▼                   topics
//!              ConsensusResult
//!                   │
//!                   ▼  SynthesisStrategy
//!                Verdict
//! ```

pub mod consensus;
pub mod stats;
pub mod topics;
pub mod verdict;
pub mod vote;

pub use consensus::{ConsensusLevel, ConsensusResult, consensus};
pub use stats::{ConfidenceStats, HIGH_VARIANCE_STDDEV};
pub use topics::classify_topics;
pub use verdict::{SynthesisStrategy, Verdict};
pub use vote::{ApproachGroup, Vote, tally};
