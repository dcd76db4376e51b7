//! Configuration validation.
//!
//! Checks a configured panel for problems that would make a consultation
//! fail or behave unexpectedly, and returns structured issues with
//! severity levels. Errors abort startup; warnings are logged.
//!
//! # Examples
//!
//! ```
//! use consilium_domain::AgentSpec;
//! use consilium_domain::config::validation::{ConfigIssueCode, has_errors, validate_agents};
//!
//! let issues = validate_agents(&[AgentSpec::new("claude"), AgentSpec::new("codex")]);
//! assert!(issues.is_empty());
//!
//! let issues = validate_agents(&[AgentSpec::new("claude")]);
//! assert_eq!(issues[0].code, ConfigIssueCode::TooFewAgents);
//! assert!(has_errors(&issues));
//! ```

use crate::agent::AgentSpec;
use crate::response::schema::{MAX_CONFIDENCE, MIN_ANSWER_CONFIDENCE};
use crate::routing::MIN_PANEL_SIZE;
use std::collections::HashSet;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// An agent has a blank name.
    EmptyAgentName,
    /// Two agents share a name.
    DuplicateAgent,
    /// An agent has a zero-second timeout.
    ZeroTimeout,
    /// Fewer than two enabled agents.
    TooFewAgents,
    /// A tier label is not economy, standard or premium.
    UnknownTier,
    /// A strategy label is not majority, risk_averse or compare_only.
    UnknownStrategy,
    /// An output format label is not full, summary or json.
    UnknownOutputFormat,
    /// Normalizer fallback confidence outside 1–10.
    FallbackConfidenceOutOfRange,
    /// Escalation threshold outside 0–10.
    ThresholdOutOfRange,
    /// Debate enabled with a single round, so it never runs.
    DebateWithoutRounds,
    /// An agent is missing the settings its adapter kind needs.
    IncompleteAdapter,
    /// A route names an agent that is not configured.
    UnknownRoutedAgent,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Whether any issue is fatal
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Panel-level checks: names, timeouts and panel size.
pub fn validate_agents(agents: &[AgentSpec]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, agent) in agents.iter().enumerate() {
        if agent.name.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyAgentName,
                format!("agents[{}] has an empty name", index),
            ));
            continue;
        }
        if !seen.insert(agent.name.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateAgent,
                format!("agent '{}' is configured more than once", agent.name),
            ));
        }
        if agent.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                format!("agent '{}' has timeout_seconds = 0", agent.name),
            ));
        }
    }

    let enabled = agents.iter().filter(|a| a.enabled).count();
    if enabled < MIN_PANEL_SIZE {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::TooFewAgents,
            format!(
                "{} enabled agent(s) configured; at least {} are required",
                enabled, MIN_PANEL_SIZE
            ),
        ));
    }

    issues
}

/// Fallback confidence must be a valid answer score
pub fn validate_fallback_confidence(value: i64) -> Option<ConfigIssue> {
    let range = i64::from(MIN_ANSWER_CONFIDENCE)..=i64::from(MAX_CONFIDENCE);
    (!range.contains(&value)).then(|| {
        ConfigIssue::error(
            ConfigIssueCode::FallbackConfidenceOutOfRange,
            format!(
                "normalizer.fallback_confidence = {} is outside {}..={}",
                value, MIN_ANSWER_CONFIDENCE, MAX_CONFIDENCE
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(issues: &[ConfigIssue]) -> Vec<ConfigIssueCode> {
        issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_valid_panel() {
        let issues = validate_agents(&[AgentSpec::new("a"), AgentSpec::new("b")]);
        assert!(issues.is_empty());
        assert!(!has_errors(&issues));
    }

    #[test]
    fn test_duplicate_and_empty_names() {
        let issues = validate_agents(&[
            AgentSpec::new("a"),
            AgentSpec::new("a"),
            AgentSpec::new("  "),
        ]);
        let codes = codes(&issues);
        assert!(codes.contains(&ConfigIssueCode::DuplicateAgent));
        assert!(codes.contains(&ConfigIssueCode::EmptyAgentName));
    }

    #[test]
    fn test_zero_timeout() {
        let issues = validate_agents(&[
            AgentSpec::new("a").with_timeout_seconds(0),
            AgentSpec::new("b"),
        ]);
        assert_eq!(codes(&issues), vec![ConfigIssueCode::ZeroTimeout]);
    }

    #[test]
    fn test_disabled_agents_do_not_count() {
        let issues = validate_agents(&[AgentSpec::new("a"), AgentSpec::new("b").disabled()]);
        assert_eq!(codes(&issues), vec![ConfigIssueCode::TooFewAgents]);
        assert!(has_errors(&issues));
    }

    #[test]
    fn test_fallback_confidence_range() {
        assert!(validate_fallback_confidence(5).is_none());
        assert!(validate_fallback_confidence(1).is_none());
        assert!(validate_fallback_confidence(10).is_none());
        assert!(validate_fallback_confidence(0).is_some());
        assert!(validate_fallback_confidence(11).is_some());
    }

    #[test]
    fn test_has_errors_false_for_warnings_only() {
        let issues = vec![ConfigIssue::warning(
            ConfigIssueCode::DebateWithoutRounds,
            "debate enabled with 1 round",
        )];
        assert!(!has_errors(&issues));
    }
}
