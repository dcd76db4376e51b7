//! Participant routing
//!
//! Picks the panel for a task from the configured agents. A category may
//! name its own agent list and a minimum capability tier; when either
//! would leave fewer than [`MIN_PANEL_SIZE`] agents, the router falls back
//! to every enabled agent.

use crate::agent::{AgentSpec, CapabilityTier};
use crate::core::task::normalize_category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Smallest panel that can produce a meaningful consensus
pub const MIN_PANEL_SIZE: usize = 2;

/// Routing rule for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRoute {
    /// Agent names to consult; empty means all
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub min_tier: Option<CapabilityTier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRouter {
    routes: BTreeMap<String, CategoryRoute>,
}

impl ParticipantRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, category: &str, route: CategoryRoute) -> Self {
        self.routes.insert(normalize_category(category), route);
        self
    }

    pub fn route_for(&self, category: &str) -> Option<&CategoryRoute> {
        self.routes.get(&normalize_category(category))
    }

    /// Enabled agents that should answer a task in `category`, in
    /// configuration order
    pub fn select<'a>(&self, category: &str, agents: &'a [AgentSpec]) -> Vec<&'a AgentSpec> {
        let enabled: Vec<&AgentSpec> = agents.iter().filter(|a| a.enabled).collect();

        let Some(route) = self.route_for(category) else {
            return enabled;
        };

        let routed: Vec<&AgentSpec> = enabled
            .iter()
            .copied()
            .filter(|a| route.agents.is_empty() || route.agents.iter().any(|n| n == &a.name))
            .filter(|a| route.min_tier.is_none_or(|min| a.tier >= min))
            .collect();

        if routed.len() < MIN_PANEL_SIZE {
            enabled
        } else {
            routed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Vec<AgentSpec> {
        vec![
            AgentSpec::new("claude").with_tier(CapabilityTier::Premium),
            AgentSpec::new("codex").with_tier(CapabilityTier::Standard),
            AgentSpec::new("gemini").with_tier(CapabilityTier::Economy),
            AgentSpec::new("grok").disabled(),
        ]
    }

    fn names(selected: &[&AgentSpec]) -> Vec<String> {
        selected.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn test_unrouted_category_uses_enabled_agents() {
        let agents = panel();
        let router = ParticipantRouter::new();
        assert_eq!(names(&router.select("general", &agents)), vec!["claude", "codex", "gemini"]);
    }

    #[test]
    fn test_min_tier_filters() {
        let agents = panel();
        let router = ParticipantRouter::new().with_route(
            "Security",
            CategoryRoute {
                agents: vec![],
                min_tier: Some(CapabilityTier::Standard),
            },
        );
        assert_eq!(names(&router.select("security", &agents)), vec!["claude", "codex"]);
    }

    #[test]
    fn test_named_agents_keep_config_order() {
        let agents = panel();
        let router = ParticipantRouter::new().with_route(
            "frontend",
            CategoryRoute {
                agents: vec!["gemini".into(), "claude".into()],
                min_tier: None,
            },
        );
        assert_eq!(names(&router.select("frontend", &agents)), vec!["claude", "gemini"]);
    }

    #[test]
    fn test_falls_back_when_route_too_narrow() {
        let agents = panel();
        let router = ParticipantRouter::new().with_route(
            "security",
            CategoryRoute {
                agents: vec![],
                min_tier: Some(CapabilityTier::Premium),
            },
        );
        // Only claude is premium; a panel of one falls back to everyone enabled
        assert_eq!(names(&router.select("security", &agents)), vec!["claude", "codex", "gemini"]);

        // Disabled agents are never routed in
        let router = ParticipantRouter::new().with_route(
            "ops",
            CategoryRoute {
                agents: vec!["grok".into(), "codex".into()],
                min_tier: None,
            },
        );
        assert_eq!(names(&router.select("ops", &agents)), vec!["claude", "codex", "gemini"]);
    }
}
