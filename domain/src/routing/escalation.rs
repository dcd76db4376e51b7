//! Escalation policy
//!
//! Pure decision functions: which low-confidence answers are worth asking
//! again of a higher-capability variant. The orchestrator applies the
//! decision at most once per consultation.

use crate::agent::AgentSpec;
use crate::quorum::ConsensusResult;
use crate::round::RoundRecord;

/// Default confidence below which an answer is escalated
pub const DEFAULT_ESCALATION_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EscalationPolicy {
    pub enabled: bool,
    /// Answers (and round means) strictly below this are escalated
    pub confidence_threshold: f64,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: DEFAULT_ESCALATION_THRESHOLD,
        }
    }
}

impl EscalationPolicy {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            enabled: true,
            confidence_threshold,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether the round as a whole is under-confident
    pub fn should_escalate(&self, consensus: &ConsensusResult) -> bool {
        self.enabled && consensus.respondents > 0 && consensus.confidence.mean < self.confidence_threshold
    }

    /// Whether a single answer is under-confident
    pub fn should_escalate_agent(&self, confidence: u8) -> bool {
        self.enabled && f64::from(confidence) < self.confidence_threshold
    }

    /// Escalated variants for the under-confident answered slots of
    /// `round`, in slot order. Agents without a higher-capability variant
    /// are skipped, as are failure slots.
    pub fn select(&self, round: &RoundRecord, agents: &[AgentSpec]) -> Vec<AgentSpec> {
        if !self.enabled {
            return Vec::new();
        }
        round
            .answered()
            .filter(|slot| self.should_escalate_agent(slot.response.score()))
            .filter_map(|slot| agents.iter().find(|a| a.name == slot.agent))
            .filter_map(AgentSpec::escalated)
            .collect()
    }
}
