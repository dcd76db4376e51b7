//! Vote types for panel consensus
//!
//! Every answered slot casts one [`Vote`] for its declared approach,
//! weighted by its confidence. Votes for the same approach (compared
//! case-insensitively) form an [`ApproachGroup`].

use crate::core::string::normalize_label;
use crate::round::AgentSlot;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A single agent's vote
///
/// # Example
///
/// ```
/// use consilium_domain::quorum::Vote;
///
/// let vote = Vote::new("claude", "  Event Sourcing ", 8);
/// assert_eq!(vote.approach, "event sourcing");
/// assert_eq!(vote.confidence, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub agent: String,
    /// Normalized approach label
    pub approach: String,
    pub confidence: u8,
}

impl Vote {
    pub fn new(agent: impl Into<String>, approach: &str, confidence: u8) -> Self {
        Self {
            agent: agent.into(),
            approach: normalize_label(approach),
            confidence,
        }
    }

    /// Vote cast by a slot, or `None` for failure slots
    pub fn from_slot(slot: &AgentSlot) -> Option<Self> {
        if slot.is_error() {
            return None;
        }
        Some(Self::new(
            slot.agent.clone(),
            slot.response.approach(),
            slot.response.score(),
        ))
    }
}

/// All votes for one approach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproachGroup {
    pub approach: String,
    /// Member agents, sorted by name
    pub agents: Vec<String>,
    /// Sum of member confidences
    pub weight: u32,
}

impl ApproachGroup {
    pub fn size(&self) -> usize {
        self.agents.len()
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.agents.iter().any(|a| a == agent)
    }

    /// Ranking used to pick the recommended group: heavier first, then
    /// larger, then the group whose first agent name sorts first.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .weight
            .cmp(&self.weight)
            .then_with(|| other.size().cmp(&self.size()))
            .then_with(|| self.agents.first().cmp(&other.agents.first()))
    }
}

/// Group votes by approach and rank the groups (winner first).
pub fn tally(votes: &[Vote]) -> Vec<ApproachGroup> {
    let mut groups: BTreeMap<&str, (Vec<String>, u32)> = BTreeMap::new();
    for vote in votes {
        let entry = groups.entry(vote.approach.as_str()).or_default();
        entry.0.push(vote.agent.clone());
        entry.1 += u32::from(vote.confidence);
    }

    let mut ranked: Vec<ApproachGroup> = groups
        .into_iter()
        .map(|(approach, (mut agents, weight))| {
            agents.sort();
            ApproachGroup {
                approach: approach.to_string(),
                agents,
                weight,
            }
        })
        .collect();
    ranked.sort_by(|a, b| a.rank(b));
    ranked
}
