//! Synthesis strategies
//!
//! A [`SynthesisStrategy`] turns the final [`ConsensusResult`] into a
//! [`Verdict`] the caller can act on.

use super::consensus::{ConsensusLevel, ConsensusResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the final consensus is turned into a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStrategy {
    /// Recommend the confidence-weighted winning approach
    #[default]
    Majority,
    /// Recommend only on strong, low-variance agreement
    RiskAverse,
    /// Lay out the approaches side by side without recommending
    CompareOnly,
}

impl SynthesisStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisStrategy::Majority => "majority",
            SynthesisStrategy::RiskAverse => "risk_averse",
            SynthesisStrategy::CompareOnly => "compare_only",
        }
    }

    pub fn verdict(&self, consensus: &ConsensusResult) -> Verdict {
        let approaches = consensus.tally.iter().map(|g| g.approach.clone()).collect();

        if consensus.respondents == 0 {
            return Verdict {
                strategy: *self,
                recommendation: None,
                requires_review: true,
                rationale: "no agent produced a usable answer".to_string(),
                approaches,
            };
        }

        let winner = consensus.recommended_approach.clone();
        let (recommendation, requires_review, rationale) = match self {
            SynthesisStrategy::Majority => {
                let weak = consensus.level <= ConsensusLevel::Low;
                let rationale = format!(
                    "{} of {} agents back this approach ({} agreement)",
                    consensus.supporting.len(),
                    consensus.respondents,
                    consensus.level
                );
                (winner, weak, rationale)
            }
            SynthesisStrategy::RiskAverse => {
                let strong = consensus.level >= ConsensusLevel::High;
                if strong && !consensus.confidence.high_variance {
                    let rationale = format!(
                        "{} agreement with consistent confidence (stddev {:.1})",
                        consensus.level, consensus.confidence.stddev
                    );
                    (winner, false, rationale)
                } else if !strong {
                    let rationale = format!(
                        "only {} agreement; review the alternatives before acting",
                        consensus.level
                    );
                    (None, true, rationale)
                } else {
                    let rationale = format!(
                        "confidence varies too much across agents (stddev {:.1})",
                        consensus.confidence.stddev
                    );
                    (None, true, rationale)
                }
            }
            SynthesisStrategy::CompareOnly => {
                let rationale = format!(
                    "{} distinct approaches across {} agents",
                    consensus.tally.len(),
                    consensus.respondents
                );
                (None, false, rationale)
            }
        };

        Verdict {
            strategy: *self,
            recommendation,
            requires_review,
            rationale,
            approaches,
        }
    }
}

impl std::fmt::Display for SynthesisStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SynthesisStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "majority" => Ok(SynthesisStrategy::Majority),
            "risk_averse" | "conservative" => Ok(SynthesisStrategy::RiskAverse),
            "compare_only" | "compare" => Ok(SynthesisStrategy::CompareOnly),
            other => Err(format!(
                "unknown strategy '{}' (expected majority, risk_averse or compare_only)",
                other
            )),
        }
    }
}

/// Final recommendation for one consultation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub strategy: SynthesisStrategy,
    pub recommendation: Option<String>,
    /// A human should look before acting on this result
    pub requires_review: bool,
    pub rationale: String,
    /// All approaches in tally order
    pub approaches: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quorum::consensus;
    use crate::round::test_support::answer;
    use crate::round::{AgentSlot, RoundRecord};

    fn consensus_of(answers: &[(&str, &str, u8)]) -> ConsensusResult {
        let slots = answers
            .iter()
            .map(|(a, approach, s)| AgentSlot::dispatched(*a, answer(a, approach, *s), false, 1))
            .collect();
        consensus(&RoundRecord::new(1, slots).unwrap())
    }

    #[test]
    fn test_majority_recommends_winner() {
        let c = consensus_of(&[("a", "x", 8), ("b", "x", 7), ("c", "x", 9), ("d", "y", 4)]);
        let v = SynthesisStrategy::Majority.verdict(&c);
        assert_eq!(v.recommendation.as_deref(), Some("x"));
        assert!(!v.requires_review);
        assert_eq!(v.approaches, vec!["x", "y"]);
    }

    #[test]
    fn test_majority_flags_weak_agreement() {
        let c = consensus_of(&[("a", "x", 5), ("b", "y", 5), ("c", "z", 5)]);
        let v = SynthesisStrategy::Majority.verdict(&c);
        assert!(v.recommendation.is_some());
        assert!(v.requires_review);
    }

    #[test]
    fn test_risk_averse_needs_strong_consistent_agreement() {
        let strong = consensus_of(&[("a", "x", 8), ("b", "x", 8), ("c", "x", 7), ("d", "y", 7)]);
        let v = SynthesisStrategy::RiskAverse.verdict(&strong);
        assert_eq!(v.recommendation.as_deref(), Some("x"));
        assert!(!v.requires_review);

        let split = consensus_of(&[("a", "x", 8), ("b", "y", 8)]);
        let v = SynthesisStrategy::RiskAverse.verdict(&split);
        assert!(v.recommendation.is_none());
        assert!(v.requires_review);

        let erratic = consensus_of(&[("a", "x", 1), ("b", "x", 10)]);
        assert!(erratic.confidence.high_variance);
        let v = SynthesisStrategy::RiskAverse.verdict(&erratic);
        assert!(v.recommendation.is_none());
        assert!(v.requires_review);
    }

    #[test]
    fn test_compare_only_never_recommends() {
        let c = consensus_of(&[("a", "x", 9), ("b", "x", 9)]);
        let v = SynthesisStrategy::CompareOnly.verdict(&c);
        assert!(v.recommendation.is_none());
        assert!(!v.requires_review);
    }

    #[test]
    fn test_no_respondents_requires_review() {
        let v = SynthesisStrategy::Majority.verdict(&ConsensusResult::empty(1));
        assert!(v.recommendation.is_none());
        assert!(v.requires_review);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("majority".parse::<SynthesisStrategy>(), Ok(SynthesisStrategy::Majority));
        assert_eq!("risk-averse".parse::<SynthesisStrategy>(), Ok(SynthesisStrategy::RiskAverse));
        assert_eq!("Compare_Only".parse::<SynthesisStrategy>(), Ok(SynthesisStrategy::CompareOnly));
        assert!("vibes".parse::<SynthesisStrategy>().is_err());
    }
}
