//! Consultation defaults from TOML (`[consult]` section)

use consilium_application::ConsultOptions;
use consilium_domain::debate::DEFAULT_DEBATE_ROUNDS;
use consilium_domain::{ConfigIssue, ConfigIssueCode, SynthesisStrategy};
use serde::{Deserialize, Serialize};

/// Raw consult configuration from TOML
///
/// # Example
///
/// ```toml
/// [consult]
/// enable_debate = true
/// debate_rounds = 3            # total rounds including round 1
/// enable_cache = true
/// enable_escalation = true
/// strategy = "risk_averse"     # "majority", "risk_averse", "compare_only"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultConfig {
    pub enable_debate: bool,
    pub debate_rounds: u32,
    pub enable_cache: bool,
    pub enable_escalation: bool,
    pub strategy: String,
}

impl Default for FileConsultConfig {
    fn default() -> Self {
        Self {
            enable_debate: false,
            debate_rounds: DEFAULT_DEBATE_ROUNDS,
            enable_cache: true,
            enable_escalation: true,
            strategy: SynthesisStrategy::default().as_str().to_string(),
        }
    }
}

impl FileConsultConfig {
    /// Parse strategy string into SynthesisStrategy, returning warnings on failure.
    pub fn parse_strategy(&self) -> (SynthesisStrategy, Vec<ConfigIssue>) {
        match self.strategy.parse::<SynthesisStrategy>() {
            Ok(strategy) => (strategy, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::UnknownStrategy,
                    format!(
                        "consult.strategy: unknown value '{}', falling back to 'majority'",
                        self.strategy
                    ),
                );
                (SynthesisStrategy::default(), vec![issue])
            }
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.parse_strategy().1;
        if self.enable_debate && self.debate_rounds < 2 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::DebateWithoutRounds,
                format!(
                    "consult.debate_rounds = {}: debate is enabled but needs at least 2 rounds to run",
                    self.debate_rounds
                ),
            ));
        }
        issues
    }

    pub fn to_options(&self) -> ConsultOptions {
        ConsultOptions {
            enable_debate: self.enable_debate,
            debate_rounds: self.debate_rounds,
            enable_cache: self.enable_cache,
            enable_escalation: self.enable_escalation,
            strategy: self.parse_strategy().0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consult_config_deserialize() {
        let toml_str = r#"
[consult]
enable_debate = true
debate_rounds = 3
strategy = "risk-averse"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let options = config.consult.to_options();
        assert!(options.enable_debate);
        assert_eq!(options.debate_rounds, 3);
        assert!(options.enable_cache);
        assert_eq!(options.strategy, SynthesisStrategy::RiskAverse);
        assert!(config.consult.validate().is_empty());
    }

    #[test]
    fn test_debate_without_rounds_warns() {
        let config = FileConsultConfig {
            enable_debate: true,
            debate_rounds: 1,
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::DebateWithoutRounds);
    }

    #[test]
    fn test_unknown_strategy_falls_back() {
        let config = FileConsultConfig {
            strategy: "coinflip".into(),
            ..Default::default()
        };
        assert_eq!(config.to_options().strategy, SynthesisStrategy::Majority);
        assert_eq!(config.validate()[0].code, ConfigIssueCode::UnknownStrategy);
    }
}
