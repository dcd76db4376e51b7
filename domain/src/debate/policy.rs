//! Continuation policy
//!
//! Decides after each completed round whether the panel debates again.
//! A mandatory-debate category always continues (until the round limit);
//! otherwise a round is only worth running while agents disagree on how
//! sure they are.

use crate::core::task::normalize_category;
use crate::quorum::ConsensusResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default confidence spread (max − min) that keeps a debate going
pub const DEFAULT_SPREAD_THRESHOLD: u8 = 3;

/// Default total round count when debate is enabled
pub const DEFAULT_DEBATE_ROUNDS: u32 = 2;

/// Why a debate ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The configured number of rounds was reached
    MaxRounds,
    /// Agents agree closely enough that another round adds nothing
    Converged,
    /// The caller aborted the consultation
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::MaxRounds => write!(f, "max_rounds"),
            StopReason::Converged => write!(f, "converged"),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of a continuation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Stop(StopReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationPolicy {
    /// Total rounds including round 1
    pub max_rounds: u32,
    pub spread_threshold: u8,
    /// Normalized category labels that always debate
    pub mandatory_categories: BTreeSet<String>,
}

impl Default for ContinuationPolicy {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_DEBATE_ROUNDS,
            spread_threshold: DEFAULT_SPREAD_THRESHOLD,
            mandatory_categories: BTreeSet::new(),
        }
    }
}

impl ContinuationPolicy {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            max_rounds,
            ..Self::default()
        }
    }

    pub fn with_spread_threshold(mut self, threshold: u8) -> Self {
        self.spread_threshold = threshold;
        self
    }

    pub fn with_mandatory_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.mandatory_categories = categories
            .into_iter()
            .map(|c| normalize_category(c.as_ref()))
            .collect();
        self
    }

    pub fn is_mandatory(&self, category: &str) -> bool {
        self.mandatory_categories.contains(&normalize_category(category))
    }

    /// Decide after `completed_round` resolved with `consensus`
    pub fn decide(&self, completed_round: u32, consensus: &ConsensusResult, category: &str) -> Continuation {
        if completed_round >= self.max_rounds {
            return Continuation::Stop(StopReason::MaxRounds);
        }
        if self.is_mandatory(category) || consensus.confidence.spread >= self.spread_threshold {
            Continuation::Continue
        } else {
            Continuation::Stop(StopReason::Converged)
        }
    }
}
