use super::{CommandAgentAdapter, HttpAgentAdapter};
use crate::config::{AdapterKind, FileAgentConfig};
use async_trait::async_trait;
use consilium_application::{AdapterError, AdapterOutput, AgentGateway};
use consilium_domain::AgentSpec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Gateway that forwards each call to the adapter registered for the
/// agent's name. Escalated variants keep their name, so they reach the
/// same adapter with a different model.
#[derive(Default)]
pub struct RoutingAgentGateway {
    adapters: HashMap<String, Arc<dyn AgentGateway>>,
}

impl RoutingAgentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, agent: impl Into<String>, adapter: Arc<dyn AgentGateway>) -> Self {
        self.adapters.insert(agent.into(), adapter);
        self
    }

    /// One adapter per configured agent.
    ///
    /// Agents missing the settings their kind needs are skipped (validation
    /// reports them); calls to them fail with `NotConfigured`.
    pub fn from_config(agents: &[FileAgentConfig]) -> Self {
        let client = reqwest::Client::new();
        let mut gateway = Self::new();

        for agent in agents {
            let name = agent.name.trim();
            let adapter: Arc<dyn AgentGateway> = match agent.kind {
                AdapterKind::Command => {
                    let Some(program) = agent.command.as_deref().filter(|c| !c.trim().is_empty()) else {
                        continue;
                    };
                    Arc::new(CommandAgentAdapter::new(program, agent.args.clone()))
                }
                AdapterKind::Http => {
                    let Some(endpoint) = agent.endpoint.as_deref().filter(|e| !e.trim().is_empty()) else {
                        continue;
                    };
                    let mut adapter = HttpAgentAdapter::new(client.clone(), endpoint);
                    if let Some(var) = &agent.api_key_env {
                        match std::env::var(var) {
                            Ok(key) => adapter = adapter.with_api_key(key),
                            Err(_) => warn!("Agent {}: environment variable {} is not set", name, var),
                        }
                    }
                    Arc::new(adapter)
                }
            };
            debug!("Agent {} routed to {:?} adapter", name, agent.kind);
            gateway.adapters.insert(name.to_string(), adapter);
        }

        gateway
    }

    pub fn has_adapter(&self, agent: &str) -> bool {
        self.adapters.contains_key(agent)
    }
}

#[async_trait]
impl AgentGateway for RoutingAgentGateway {
    async fn invoke(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        context: Option<&str>,
        timeout: Duration,
    ) -> Result<AdapterOutput, AdapterError> {
        let adapter = self
            .adapters
            .get(&agent.name)
            .ok_or_else(|| AdapterError::NotConfigured(agent.name.clone()))?;
        adapter.invoke(agent, prompt, context, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl AgentGateway for Fixed {
        async fn invoke(
            &self,
            _agent: &AgentSpec,
            _prompt: &str,
            _context: Option<&str>,
            _timeout: Duration,
        ) -> Result<AdapterOutput, AdapterError> {
            Ok(AdapterOutput::text(self.0))
        }
    }

    #[tokio::test]
    async fn test_routes_by_agent_name() {
        let gateway = RoutingAgentGateway::new()
            .with_adapter("a", Arc::new(Fixed("from a")))
            .with_adapter("b", Arc::new(Fixed("from b")));

        let timeout = Duration::from_secs(1);
        let a = gateway.invoke(&AgentSpec::new("a"), "q", None, timeout).await.unwrap();
        let b = gateway.invoke(&AgentSpec::new("b"), "q", None, timeout).await.unwrap();
        assert_eq!(a.raw.as_text(), "from a");
        assert_eq!(b.raw.as_text(), "from b");

        let err = gateway
            .invoke(&AgentSpec::new("z"), "q", None, timeout)
            .await
            .unwrap_err();
        assert_eq!(err, AdapterError::NotConfigured("z".into()));
    }

    #[test]
    fn test_from_config_skips_incomplete_agents() {
        let agents = vec![
            FileAgentConfig {
                name: "cli".into(),
                command: Some("claude".into()),
                ..Default::default()
            },
            FileAgentConfig {
                name: "web".into(),
                kind: AdapterKind::Http,
                endpoint: Some("http://localhost:9/".into()),
                ..Default::default()
            },
            FileAgentConfig {
                name: "broken".into(),
                ..Default::default()
            },
        ];

        let gateway = RoutingAgentGateway::from_config(&agents);
        assert!(gateway.has_adapter("cli"));
        assert!(gateway.has_adapter("web"));
        assert!(!gateway.has_adapter("broken"));
    }
}
