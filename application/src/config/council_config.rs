//! Council configuration container.
//!
//! [`CouncilConfig`] is built once at startup (from the file config in the
//! infrastructure layer, or by hand in tests) and handed to the consult use
//! case. Nothing in it changes during a consultation.
//!
//! | Part | Used by |
//! |------|---------|
//! | agents | routing, dispatch, escalation |
//! | `ConsultOptions` | consult (defaults; the CLI overrides per run) |
//! | `DispatchParams` | dispatcher |
//! | `DebateConfig` | debate controller |
//! | `EscalationPolicy` | escalation |
//! | `ParticipantRouter` | routing |
//! | cache TTL | cache store |
//! | `ResponseNormalizer` | dispatcher |

use super::{ConsultOptions, DebateConfig, DispatchParams};
use consilium_domain::config::validation::{has_errors, validate_agents};
use consilium_domain::{AgentSpec, ConfigIssue, EscalationPolicy, ParticipantRouter, ResponseNormalizer};
use std::time::Duration;

/// Default time an agent answer stays in the cache
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct CouncilConfig {
    agents: Vec<AgentSpec>,
    options: ConsultOptions,
    dispatch: DispatchParams,
    debate: DebateConfig,
    escalation: EscalationPolicy,
    router: ParticipantRouter,
    cache_ttl: Duration,
    normalizer: ResponseNormalizer,
}

impl CouncilConfig {
    pub fn new(agents: Vec<AgentSpec>) -> Self {
        Self {
            agents,
            options: ConsultOptions::default(),
            dispatch: DispatchParams::default(),
            debate: DebateConfig::default(),
            escalation: EscalationPolicy::default(),
            router: ParticipantRouter::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            normalizer: ResponseNormalizer::default(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_options(mut self, options: ConsultOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchParams) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_debate(mut self, debate: DebateConfig) -> Self {
        self.debate = debate;
        self
    }

    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn with_router(mut self, router: ParticipantRouter) -> Self {
        self.router = router;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_normalizer(mut self, normalizer: ResponseNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    // ==================== Accessors ====================

    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn options(&self) -> &ConsultOptions {
        &self.options
    }

    pub fn dispatch(&self) -> &DispatchParams {
        &self.dispatch
    }

    pub fn debate(&self) -> &DebateConfig {
        &self.debate
    }

    pub fn escalation(&self) -> &EscalationPolicy {
        &self.escalation
    }

    pub fn router(&self) -> &ParticipantRouter {
        &self.router
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn normalizer(&self) -> ResponseNormalizer {
        self.normalizer
    }

    // ==================== Validation ====================

    /// Panel-level issues in this configuration
    pub fn validate(&self) -> Vec<ConfigIssue> {
        validate_agents(&self.agents)
    }

    pub fn is_valid(&self) -> bool {
        !has_errors(&self.validate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CouncilConfig::new(vec![AgentSpec::new("a"), AgentSpec::new("b")]);
        assert!(config.is_valid());
        assert_eq!(config.cache_ttl(), DEFAULT_CACHE_TTL);
        assert_eq!(config.normalizer().fallback_confidence(), 5);
        assert!(config.agent("b").is_some());
        assert!(config.agent("z").is_none());
    }

    #[test]
    fn test_single_agent_is_invalid() {
        let config = CouncilConfig::new(vec![AgentSpec::new("a")]);
        assert!(!config.is_valid());
    }
}
