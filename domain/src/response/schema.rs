//! Agent response schema
//!
//! [`AgentResponse`] is the one shape every downstream consumer sees. Its JSON
//! form is the wire contract agents are asked to emit:
//!
//! ```json
//! {
//!   "consultant": "claude",
//!   "model": "claude-sonnet",
//!   "persona": "architect",
//!   "response": {
//!     "summary": "...", "detailed": "...", "approach": "event sourcing",
//!     "pros": [], "cons": [], "caveats": []
//!   },
//!   "confidence": { "score": 8, "reasoning": "...", "uncertainty_factors": [] },
//!   "metadata": { "tokens_used": 0, "latency_ms": 1200, "timestamp": 1700000000000 }
//! }
//! ```
//!
//! Two optional fields ride along: `error` (only on synthetic failure
//! responses) and `debate` (only on answers from a debate round).

use crate::core::clock::current_timestamp;
use crate::debate::turn::DebateTurn;
use serde::{Deserialize, Serialize};

/// Lowest confidence a real answer may carry; 0 marks a hard failure
pub const MIN_ANSWER_CONFIDENCE: u8 = 1;

/// Highest confidence score
pub const MAX_CONFIDENCE: u8 = 10;

/// The answer body of a response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseBody {
    pub summary: String,
    pub detailed: String,
    /// Declared approach label; responses are grouped on this for voting
    pub approach: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub caveats: Vec<String>,
}

/// Self-reported confidence
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Confidence {
    /// 1–10 for answers, 0 for hard failures
    pub score: u8,
    pub reasoning: String,
    #[serde(default)]
    pub uncertainty_factors: Vec<String>,
}

/// Per-call metadata stamped by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub latency_ms: u64,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: u64,
    /// Round that produced this response (1-indexed)
    #[serde(default)]
    pub round: u32,
}

/// One agent's answer for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub consultant: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub persona: String,
    pub response: ResponseBody,
    pub confidence: Confidence,
    #[serde(default)]
    pub metadata: ResponseMetadata,
    /// Set only on synthetic failure responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Position update emitted during a debate round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debate: Option<DebateTurn>,
}

impl AgentResponse {
    /// Synthetic failure response: confidence 0 and `error` set.
    pub fn failure(
        consultant: impl Into<String>,
        model: impl Into<String>,
        round: u32,
        error: impl Into<String>,
    ) -> Self {
        let error = error.into();
        Self {
            consultant: consultant.into(),
            model: model.into(),
            persona: String::new(),
            response: ResponseBody {
                summary: String::new(),
                detailed: String::new(),
                approach: String::new(),
                pros: Vec::new(),
                cons: Vec::new(),
                caveats: Vec::new(),
            },
            confidence: Confidence {
                score: 0,
                reasoning: error.clone(),
                uncertainty_factors: Vec::new(),
            },
            metadata: ResponseMetadata {
                tokens_used: 0,
                latency_ms: 0,
                timestamp: current_timestamp(),
                round,
            },
            error: Some(error),
            debate: None,
        }
    }

    /// Whether this is a synthetic failure response
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn score(&self) -> u8 {
        self.confidence.score
    }

    pub fn summary(&self) -> &str {
        &self.response.summary
    }

    pub fn approach(&self) -> &str {
        &self.response.approach
    }

    /// Stamp per-call metadata, keeping any token count the agent reported.
    pub fn with_metadata(mut self, round: u32, latency_ms: u64, tokens_used: Option<u64>) -> Self {
        self.metadata.round = round;
        self.metadata.latency_ms = latency_ms;
        self.metadata.timestamp = current_timestamp();
        if let Some(tokens) = tokens_used {
            self.metadata.tokens_used = tokens;
        }
        self
    }
}
