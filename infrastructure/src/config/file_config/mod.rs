//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod cache;
mod consult;
mod engine;
mod output;

pub use agent::{AdapterKind, FileAgentConfig};
pub use cache::{CacheBackend, FileCacheConfig};
pub use consult::FileConsultConfig;
pub use engine::{
    FileDebateConfig, FileDispatchConfig, FileEscalationConfig, FileNormalizerConfig, FileRouteConfig,
    FileRoutingConfig, build_router,
};
pub use output::{FileLoggingConfig, FileOutputConfig, FileOutputFormat};

use consilium_application::CouncilConfig;
use consilium_domain::config::validation::{has_errors, validate_agents};
use consilium_domain::{AgentSpec, ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("{} configuration error(s); first: {}", .0.len(), first_message(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn first_message(issues: &[ConfigIssue]) -> &str {
    issues.first().map(|i| i.message.as_str()).unwrap_or_default()
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// The panel
    pub agents: Vec<FileAgentConfig>,
    /// Per-consultation defaults
    pub consult: FileConsultConfig,
    pub dispatch: FileDispatchConfig,
    pub debate: FileDebateConfig,
    pub cache: FileCacheConfig,
    pub escalation: FileEscalationConfig,
    /// Category routes
    pub routing: FileRoutingConfig,
    pub normalizer: FileNormalizerConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Agent names, timeouts and panel size
    /// 2. Enum parse failures (tiers, strategy, route tiers)
    /// 3. Adapter settings for each enabled agent
    /// 4. Numeric ranges (fallback confidence, escalation threshold)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Panel checks
        issues.extend(validate_agents(&self.agent_specs()));

        // 2. Enum parse validation
        for agent in &self.agents {
            issues.extend(agent.parse_tier().1);
        }
        issues.extend(self.consult.validate());
        issues.extend(build_router(&self.routing, &self.agent_names()).1);

        // 3. Adapter completeness
        for agent in &self.agents {
            issues.extend(agent.adapter_issues());
        }

        // 4. Ranges
        issues.extend(self.normalizer.validate());
        issues.extend(self.escalation.validate());

        issues
    }

    pub fn agent_specs(&self) -> Vec<AgentSpec> {
        self.agents.iter().map(FileAgentConfig::to_spec).collect()
    }

    fn agent_names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.trim()).collect()
    }

    /// Warnings only; use after [`to_council_config`](Self::to_council_config) succeeded
    pub fn warnings(&self) -> Vec<ConfigIssue> {
        self.validate()
            .into_iter()
            .filter(|i| i.severity == Severity::Warning)
            .collect()
    }

    /// Convert into the immutable application configuration.
    ///
    /// Fails when validation reports any error; warnings do not block.
    pub fn to_council_config(&self) -> Result<CouncilConfig, ConfigValidationError> {
        let issues = self.validate();
        if has_errors(&issues) {
            let errors = issues
                .into_iter()
                .filter(|i| i.severity == Severity::Error)
                .collect();
            return Err(ConfigValidationError::Invalid(errors));
        }

        let (router, _) = build_router(&self.routing, &self.agent_names());
        Ok(CouncilConfig::new(self.agent_specs())
            .with_options(self.consult.to_options())
            .with_dispatch(self.dispatch.to_params())
            .with_debate(self.debate.to_debate_config())
            .with_escalation(self.escalation.to_policy())
            .with_router(router)
            .with_cache_ttl(self.cache.ttl())
            .with_normalizer(self.normalizer.to_normalizer()))
    }
}
