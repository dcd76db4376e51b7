//! Debate turn payload
//!
//! The `debate` sub-object an agent emits alongside its revised answer in
//! rounds 2..K.

use serde::{Deserialize, Serialize};

/// Severity tag attached to a critique
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CritiqueSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl CritiqueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CritiqueSeverity::Low => "low",
            CritiqueSeverity::Medium => "medium",
            CritiqueSeverity::High => "high",
            CritiqueSeverity::Critical => "critical",
        }
    }

    /// Case-insensitive match on the severity vocabulary
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(CritiqueSeverity::Low),
            "medium" => Some(CritiqueSeverity::Medium),
            "high" => Some(CritiqueSeverity::High),
            "critical" => Some(CritiqueSeverity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for CritiqueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A critique of one named peer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique {
    /// Peer label as it appeared in the prompt (agent name or `Peer X`)
    pub target: String,
    #[serde(default)]
    pub severity: CritiqueSeverity,
    pub point: String,
}

/// Position update for one agent in one debate round
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebateTurn {
    #[serde(default)]
    pub position_changed: bool,
    #[serde(default)]
    pub stance: String,
    /// Confidence change relative to the agent's previous round
    #[serde(default)]
    pub confidence_delta: i8,
    #[serde(default)]
    pub critiques: Vec<Critique>,
}

impl DebateTurn {
    pub fn critiques_at_least(&self, severity: CritiqueSeverity) -> impl Iterator<Item = &Critique> {
        self.critiques.iter().filter(move |c| c.severity >= severity)
    }
}
