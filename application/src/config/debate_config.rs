//! Debate configuration.

use consilium_domain::ContinuationPolicy;
use consilium_domain::debate::DEFAULT_SPREAD_THRESHOLD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Confidence spread (max − min) at or above which another round runs
    pub spread_threshold: u8,
    /// Categories that always debate up to the round limit
    pub mandatory_categories: Vec<String>,
    /// Show peers as `Peer A`, `Peer B`, … instead of agent names
    pub anonymize_peers: bool,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            spread_threshold: DEFAULT_SPREAD_THRESHOLD,
            mandatory_categories: Vec::new(),
            anonymize_peers: false,
        }
    }
}

impl DebateConfig {
    /// Continuation policy for a debate of `max_rounds` total rounds
    pub fn policy(&self, max_rounds: u32) -> ContinuationPolicy {
        ContinuationPolicy::new(max_rounds)
            .with_spread_threshold(self.spread_threshold)
            .with_mandatory_categories(&self.mandatory_categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_carries_settings() {
        let config = DebateConfig {
            spread_threshold: 4,
            mandatory_categories: vec!["Security".to_string()],
            anonymize_peers: true,
        };
        let policy = config.policy(3);
        assert_eq!(policy.max_rounds, 3);
        assert_eq!(policy.spread_threshold, 4);
        assert!(policy.is_mandatory("security"));
    }
}
