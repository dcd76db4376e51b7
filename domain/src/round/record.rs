//! Round records
//!
//! A [`RoundRecord`] is one synchronized batch of agent answers. It holds
//! exactly one [`AgentSlot`] per dispatched agent, in dispatch order, and is
//! never mutated once built: round k reads round k-1 but builds its own
//! record. Replacing a slot (escalation) produces a new record.

use crate::core::clock::current_timestamp;
use crate::core::error::DomainError;
use crate::response::AgentResponse;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a slot's response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// Fresh adapter call in this round
    Dispatched,
    /// Served from the response cache
    Cached,
    /// Debate round failed for this agent; previous answer kept
    CarriedForward,
    /// Replaced by a higher-capability variant
    Escalated,
}

/// Per-agent status reported alongside the aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// A usable answer
    Ok,
    /// The agent answered, but with nothing usable in it
    Empty,
    /// Timed out or errored after all retries
    Failed,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotStatus::Ok => write!(f, "ok"),
            SlotStatus::Empty => write!(f, "empty"),
            SlotStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One agent's slot in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSlot {
    pub agent: String,
    pub response: AgentResponse,
    /// Output did not follow the schema and was wrapped by the normalizer
    pub degraded: bool,
    pub source: SlotSource,
    /// Adapter calls made for this slot (0 for cached / carried slots)
    pub attempts: u32,
}

impl AgentSlot {
    pub fn dispatched(agent: impl Into<String>, response: AgentResponse, degraded: bool, attempts: u32) -> Self {
        Self {
            agent: agent.into(),
            response,
            degraded,
            source: SlotSource::Dispatched,
            attempts,
        }
    }

    pub fn cached(agent: impl Into<String>, response: AgentResponse) -> Self {
        Self {
            agent: agent.into(),
            response,
            degraded: false,
            source: SlotSource::Cached,
            attempts: 0,
        }
    }

    /// The same slot moved into a later round, unchanged except for its source
    pub fn carried_forward(&self) -> Self {
        Self {
            source: SlotSource::CarriedForward,
            attempts: 0,
            ..self.clone()
        }
    }

    pub fn is_error(&self) -> bool {
        self.response.is_error()
    }

    pub fn status(&self) -> SlotStatus {
        if self.response.is_error() {
            SlotStatus::Failed
        } else if self.response.response.detailed.trim().is_empty()
            && (self.degraded || self.response.response.summary.trim().is_empty())
        {
            SlotStatus::Empty
        } else {
            SlotStatus::Ok
        }
    }
}

/// Ordered collection of agent slots for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number (1-indexed)
    pub round: u32,
    /// Milliseconds since epoch when the round resolved
    pub timestamp: u64,
    slots: Vec<AgentSlot>,
}

impl RoundRecord {
    /// Build a round, rejecting duplicate agents
    pub fn new(round: u32, slots: Vec<AgentSlot>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for slot in &slots {
            if !seen.insert(slot.agent.as_str()) {
                return Err(DomainError::DuplicateAgent(slot.agent.clone()));
            }
        }
        Ok(Self {
            round,
            timestamp: current_timestamp(),
            slots,
        })
    }

    pub fn slots(&self) -> &[AgentSlot] {
        &self.slots
    }

    pub fn into_slots(self) -> Vec<AgentSlot> {
        self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, agent: &str) -> Option<&AgentSlot> {
        self.slots.iter().find(|s| s.agent == agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.agent.as_str())
    }

    /// Responses that are not synthetic failures
    pub fn answered(&self) -> impl Iterator<Item = &AgentSlot> {
        self.slots.iter().filter(|s| !s.is_error())
    }

    pub fn failed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_error()).count()
    }

    /// `(agent, status)` for every slot, in slot order
    pub fn statuses(&self) -> Vec<(String, SlotStatus)> {
        self.slots
            .iter()
            .map(|s| (s.agent.clone(), s.status()))
            .collect()
    }

    /// A new record with `replacement` in place of the slot for the same agent.
    ///
    /// Slot order is preserved. Returns `None` if the agent has no slot here.
    pub fn with_slot_replaced(&self, replacement: AgentSlot) -> Option<Self> {
        let index = self.slots.iter().position(|s| s.agent == replacement.agent)?;
        let mut slots = self.slots.clone();
        slots[index] = replacement;
        Some(Self {
            round: self.round,
            timestamp: current_timestamp(),
            slots,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::response::{AgentResponse, Confidence, ResponseBody, ResponseMetadata};

    /// Schema-conformant response for tests
    pub fn answer(agent: &str, approach: &str, score: u8) -> AgentResponse {
        AgentResponse {
            consultant: agent.to_string(),
            model: "test-model".to_string(),
            persona: String::new(),
            response: ResponseBody {
                summary: format!("{} recommends {}", agent, approach),
                detailed: format!("Detailed reasoning for {}", approach),
                approach: approach.to_string(),
                pros: Vec::new(),
                cons: Vec::new(),
                caveats: Vec::new(),
            },
            confidence: Confidence {
                score,
                reasoning: "test".to_string(),
                uncertainty_factors: Vec::new(),
            },
            metadata: ResponseMetadata {
                round: 1,
                ..ResponseMetadata::default()
            },
            error: None,
            debate: None,
        }
    }
}
