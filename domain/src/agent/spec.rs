//! Agent descriptors
//!
//! An [`AgentSpec`] is the static, read-only description of one responder on
//! the panel. Specs are built once from configuration at startup and shared
//! by reference afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-call timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 180;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Capability tier of an agent (Value Object)
///
/// Ordered from cheapest to most capable; escalation always moves upward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTier {
    Economy,
    #[default]
    Standard,
    Premium,
}

impl CapabilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityTier::Economy => "economy",
            CapabilityTier::Standard => "standard",
            CapabilityTier::Premium => "premium",
        }
    }

    /// The next tier up, or `None` at the top
    pub fn next(&self) -> Option<CapabilityTier> {
        match self {
            CapabilityTier::Economy => Some(CapabilityTier::Standard),
            CapabilityTier::Standard => Some(CapabilityTier::Premium),
            CapabilityTier::Premium => None,
        }
    }
}

impl std::fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CapabilityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "economy" | "eco" | "fast" => Ok(CapabilityTier::Economy),
            "standard" | "std" => Ok(CapabilityTier::Standard),
            "premium" | "max" => Ok(CapabilityTier::Premium),
            other => Err(format!(
                "Unknown capability tier: {}. Valid: economy, standard, premium",
                other
            )),
        }
    }
}

/// Static descriptor of one agent on the panel
///
/// # Example
///
/// ```
/// use consilium_domain::agent::{AgentSpec, CapabilityTier};
///
/// let agent = AgentSpec::new("claude")
///     .with_tier(CapabilityTier::Standard)
///     .with_timeout_seconds(60)
///     .with_escalation_model("claude-opus");
///
/// let escalated = agent.escalated().unwrap();
/// assert_eq!(escalated.name, "claude");
/// assert_eq!(escalated.tier, CapabilityTier::Premium);
/// assert_eq!(escalated.model.as_deref(), Some("claude-opus"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique agent name; also the slot key in every round
    pub name: String,
    pub tier: CapabilityTier,
    /// Hard wall-clock limit for a single call
    pub timeout_seconds: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
    /// Model identifier passed to the adapter, if the adapter takes one
    pub model: Option<String>,
    /// Persona injected into the prompt and echoed in the response
    pub persona: Option<String>,
    /// Higher-capability model used when this agent's slot is escalated
    pub escalation_model: Option<String>,
    pub enabled: bool,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tier: CapabilityTier::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_retries: DEFAULT_MAX_RETRIES,
            model: None,
            persona: None,
            escalation_model: None,
            enabled: true,
        }
    }

    pub fn with_tier(mut self, tier: CapabilityTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn with_escalation_model(mut self, model: impl Into<String>) -> Self {
        self.escalation_model = Some(model.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Model label reported in responses (`default` when unset)
    pub fn model_label(&self) -> &str {
        self.model.as_deref().unwrap_or("default")
    }

    /// Whether a higher-capability variant exists for this agent
    pub fn can_escalate(&self) -> bool {
        self.escalation_model.is_some()
    }

    /// Higher-capability variant of the same role.
    ///
    /// Keeps the name (so it maps onto the same slot), switches to the
    /// escalation model and raises the tier to premium. Returns `None` when
    /// no escalation model is configured.
    pub fn escalated(&self) -> Option<AgentSpec> {
        let model = self.escalation_model.clone()?;
        Some(AgentSpec {
            model: Some(model),
            tier: CapabilityTier::Premium,
            escalation_model: None,
            ..self.clone()
        })
    }
}

impl std::fmt::Display for AgentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
