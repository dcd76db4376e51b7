//! Engine tuning from TOML: `[dispatch]`, `[debate]`, `[escalation]`,
//! `[routing]` and `[normalizer]` sections

use consilium_application::{DebateConfig, DispatchParams};
use consilium_domain::config::validation::validate_fallback_confidence;
use consilium_domain::debate::DEFAULT_SPREAD_THRESHOLD;
use consilium_domain::response::DEFAULT_FALLBACK_CONFIDENCE;
use consilium_domain::response::schema::MAX_CONFIDENCE;
use consilium_domain::routing::DEFAULT_ESCALATION_THRESHOLD;
use consilium_domain::{
    CapabilityTier, CategoryRoute, ConfigIssue, ConfigIssueCode, EscalationPolicy, ParticipantRouter,
    ResponseNormalizer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// `[dispatch]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Pause between attempts for the same agent
    pub retry_delay_ms: u64,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: u64::try_from(consilium_application::config::DEFAULT_RETRY_DELAY.as_millis())
                .unwrap_or(1_000),
        }
    }
}

impl FileDispatchConfig {
    pub fn to_params(&self) -> DispatchParams {
        DispatchParams::default().with_retry_delay(Duration::from_millis(self.retry_delay_ms))
    }
}

/// `[debate]`
///
/// ```toml
/// [debate]
/// spread_threshold = 3
/// mandatory_categories = ["security", "architecture"]
/// anonymize_peers = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDebateConfig {
    pub spread_threshold: u8,
    pub mandatory_categories: Vec<String>,
    pub anonymize_peers: bool,
}

impl Default for FileDebateConfig {
    fn default() -> Self {
        Self {
            spread_threshold: DEFAULT_SPREAD_THRESHOLD,
            mandatory_categories: Vec::new(),
            anonymize_peers: false,
        }
    }
}

impl FileDebateConfig {
    pub fn to_debate_config(&self) -> DebateConfig {
        DebateConfig {
            spread_threshold: self.spread_threshold,
            mandatory_categories: self.mandatory_categories.clone(),
            anonymize_peers: self.anonymize_peers,
        }
    }
}

/// `[escalation]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEscalationConfig {
    pub enabled: bool,
    pub confidence_threshold: f64,
}

impl Default for FileEscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: DEFAULT_ESCALATION_THRESHOLD,
        }
    }
}

impl FileEscalationConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let max = f64::from(MAX_CONFIDENCE);
        if (0.0..=max).contains(&self.confidence_threshold) {
            vec![]
        } else {
            vec![ConfigIssue::error(
                ConfigIssueCode::ThresholdOutOfRange,
                format!(
                    "escalation.confidence_threshold = {} is outside 0..={}",
                    self.confidence_threshold, max
                ),
            )]
        }
    }

    pub fn to_policy(&self) -> EscalationPolicy {
        if self.enabled {
            EscalationPolicy::new(self.confidence_threshold)
        } else {
            EscalationPolicy::disabled()
        }
    }
}

/// One `[routing.<category>]` table
///
/// ```toml
/// [routing.security]
/// agents = ["claude", "codex"]
/// min_tier = "standard"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRouteConfig {
    pub agents: Vec<String>,
    pub min_tier: Option<String>,
}

/// `[routing]`: category label to route
pub type FileRoutingConfig = BTreeMap<String, FileRouteConfig>;

/// Router and issues for the routing table, checked against the
/// configured agent names
pub fn build_router(routing: &FileRoutingConfig, agent_names: &[&str]) -> (ParticipantRouter, Vec<ConfigIssue>) {
    let mut router = ParticipantRouter::new();
    let mut issues = Vec::new();

    for (category, route) in routing {
        for name in &route.agents {
            if !agent_names.contains(&name.as_str()) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownRoutedAgent,
                    format!("routing.{}: agent '{}' is not configured", category, name),
                ));
            }
        }

        let min_tier = match route.min_tier.as_deref().map(str::parse::<CapabilityTier>) {
            None => None,
            Some(Ok(tier)) => Some(tier),
            Some(Err(_)) => {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownTier,
                    format!(
                        "routing.{}.min_tier: unknown value '{}', ignoring",
                        category,
                        route.min_tier.as_deref().unwrap_or_default()
                    ),
                ));
                None
            }
        };

        router = router.with_route(
            category,
            CategoryRoute {
                agents: route.agents.clone(),
                min_tier,
            },
        );
    }

    (router, issues)
}

/// `[normalizer]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNormalizerConfig {
    /// Confidence given to answers that did not follow the schema
    pub fallback_confidence: i64,
}

impl Default for FileNormalizerConfig {
    fn default() -> Self {
        Self {
            fallback_confidence: i64::from(DEFAULT_FALLBACK_CONFIDENCE),
        }
    }
}

impl FileNormalizerConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        validate_fallback_confidence(self.fallback_confidence).into_iter().collect()
    }

    /// Out-of-range values are clamped; [`validate`](Self::validate) reports them
    pub fn to_normalizer(&self) -> ResponseNormalizer {
        let clamped = self.fallback_confidence.clamp(0, i64::from(MAX_CONFIDENCE));
        ResponseNormalizer::new(u8::try_from(clamped).unwrap_or(DEFAULT_FALLBACK_CONFIDENCE))
    }
}
