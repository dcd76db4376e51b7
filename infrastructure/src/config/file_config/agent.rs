//! Agent configuration from TOML (`[[agents]]` array)

use consilium_domain::agent::spec::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECONDS};
use consilium_domain::{AgentSpec, CapabilityTier, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// How an agent is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Local program: prompt on stdin, answer on stdout
    #[default]
    Command,
    /// HTTP endpoint accepting a JSON request
    Http,
}

/// Raw agent entry from TOML
///
/// # Example
///
/// ```toml
/// [[agents]]
/// name = "claude"
/// tier = "standard"
/// timeout_seconds = 120
/// model = "sonnet"
/// escalation_model = "opus"
/// persona = "security reviewer"
/// kind = "command"
/// command = "claude"
/// args = ["-p", "--output-format", "json"]
///
/// [[agents]]
/// name = "local"
/// kind = "http"
/// endpoint = "http://localhost:8080/v1/consult"
/// api_key_env = "LOCAL_AGENT_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub name: String,
    /// "economy", "standard" or "premium"
    pub tier: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub model: Option<String>,
    pub persona: Option<String>,
    pub escalation_model: Option<String>,
    pub enabled: bool,
    pub kind: AdapterKind,
    /// Program to run (command agents)
    pub command: Option<String>,
    pub args: Vec<String>,
    /// URL to POST to (http agents)
    pub endpoint: Option<String>,
    /// Environment variable holding a bearer token (http agents)
    pub api_key_env: Option<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            tier: CapabilityTier::default().as_str().to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: DEFAULT_MAX_RETRIES,
            model: None,
            persona: None,
            escalation_model: None,
            enabled: true,
            kind: AdapterKind::default(),
            command: None,
            args: Vec::new(),
            endpoint: None,
            api_key_env: None,
        }
    }
}

impl FileAgentConfig {
    /// Parse tier string into CapabilityTier, returning warnings on failure.
    pub fn parse_tier(&self) -> (CapabilityTier, Vec<ConfigIssue>) {
        match self.tier.parse::<CapabilityTier>() {
            Ok(tier) => (tier, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::UnknownTier,
                    format!(
                        "agents.{}.tier: unknown value '{}', falling back to 'standard'",
                        self.name, self.tier
                    ),
                );
                (CapabilityTier::default(), vec![issue])
            }
        }
    }

    /// Adapter settings this agent's kind cannot work without
    pub fn adapter_issues(&self) -> Vec<ConfigIssue> {
        let missing = match self.kind {
            AdapterKind::Command if self.command.as_deref().is_none_or(|c| c.trim().is_empty()) => {
                Some("command")
            }
            AdapterKind::Http if self.endpoint.as_deref().is_none_or(|e| e.trim().is_empty()) => {
                Some("endpoint")
            }
            _ => None,
        };
        match missing {
            Some(field) if self.enabled => vec![ConfigIssue::error(
                ConfigIssueCode::IncompleteAdapter,
                format!("agents.{}: {:?} agent needs '{}'", self.name, self.kind, field),
            )],
            _ => vec![],
        }
    }

    pub fn to_spec(&self) -> AgentSpec {
        let mut spec = AgentSpec::new(self.name.trim())
            .with_tier(self.parse_tier().0)
            .with_timeout_seconds(self.timeout_seconds)
            .with_max_retries(self.max_retries);
        spec.model = self.model.clone();
        spec.persona = self.persona.clone();
        spec.escalation_model = self.escalation_model.clone();
        spec.enabled = self.enabled;
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agents_deserialize() {
        let toml_str = r#"
[[agents]]
name = "claude"
tier = "premium"
command = "claude"
args = ["-p"]
escalation_model = "opus"

[[agents]]
name = "local"
kind = "http"
endpoint = "http://localhost:8080"
enabled = false
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agents.len(), 2);

        let claude = &config.agents[0];
        assert_eq!(claude.kind, AdapterKind::Command);
        assert_eq!(claude.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        let spec = claude.to_spec();
        assert_eq!(spec.tier, CapabilityTier::Premium);
        assert!(spec.can_escalate());

        let local = &config.agents[1];
        assert_eq!(local.kind, AdapterKind::Http);
        assert!(!local.to_spec().enabled);
    }

    #[test]
    fn test_unknown_tier_falls_back() {
        let agent = FileAgentConfig {
            name: "x".into(),
            tier: "gold".into(),
            ..Default::default()
        };
        let (tier, issues) = agent.parse_tier();
        assert_eq!(tier, CapabilityTier::Standard);
        assert_eq!(issues[0].code, ConfigIssueCode::UnknownTier);
    }

    #[test]
    fn test_adapter_issues() {
        let agent = FileAgentConfig {
            name: "x".into(),
            ..Default::default()
        };
        assert_eq!(agent.adapter_issues()[0].code, ConfigIssueCode::IncompleteAdapter);

        let agent = FileAgentConfig {
            name: "x".into(),
            command: Some("x".into()),
            ..Default::default()
        };
        assert!(agent.adapter_issues().is_empty());

        // Disabled agents are never invoked
        let agent = FileAgentConfig {
            name: "x".into(),
            kind: AdapterKind::Http,
            enabled: false,
            ..Default::default()
        };
        assert!(agent.adapter_issues().is_empty());
    }
}
