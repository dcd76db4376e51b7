//! Per-consultation switches.

use consilium_domain::SynthesisStrategy;
use consilium_domain::debate::DEFAULT_DEBATE_ROUNDS;
use serde::{Deserialize, Serialize};

/// Options the caller picks for one consultation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultOptions {
    pub enable_debate: bool,
    /// Total rounds including round 1
    pub debate_rounds: u32,
    pub enable_cache: bool,
    pub enable_escalation: bool,
    pub strategy: SynthesisStrategy,
}

impl Default for ConsultOptions {
    fn default() -> Self {
        Self {
            enable_debate: false,
            debate_rounds: DEFAULT_DEBATE_ROUNDS,
            enable_cache: true,
            enable_escalation: true,
            strategy: SynthesisStrategy::default(),
        }
    }
}

impl ConsultOptions {
    // ==================== Builder Methods ====================

    pub fn with_debate(mut self, rounds: u32) -> Self {
        self.enable_debate = true;
        self.debate_rounds = rounds;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.enable_cache = false;
        self
    }

    pub fn without_escalation(mut self) -> Self {
        self.enable_escalation = false;
        self
    }

    pub fn with_strategy(mut self, strategy: SynthesisStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Rounds the debate may run; 1 when debate is off
    pub fn effective_rounds(&self) -> u32 {
        if self.enable_debate {
            self.debate_rounds.max(1)
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConsultOptions::default();
        assert!(!options.enable_debate);
        assert!(options.enable_cache);
        assert!(options.enable_escalation);
        assert_eq!(options.strategy, SynthesisStrategy::Majority);
        assert_eq!(options.effective_rounds(), 1);
    }

    #[test]
    fn test_effective_rounds() {
        assert_eq!(ConsultOptions::default().with_debate(3).effective_rounds(), 3);
        assert_eq!(ConsultOptions::default().with_debate(0).effective_rounds(), 1);
    }
}
