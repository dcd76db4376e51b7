//! Panel consensus
//!
//! [`ConsensusResult::from_round`] is a pure function of one
//! [`RoundRecord`]. It is recomputed whenever a round changes and never
//! stored as source of truth.
//!
//! # Scoring
//!
//! ```text
//! score = round(largest_group / answered * 100)
//!
//!   100      unanimous
//!   75..=99  high
//!   50..=74  medium
//!   25..=49  low
//!   0..=24   none
//! ```

use super::stats::ConfidenceStats;
use super::topics::classify_topics;
use super::vote::{ApproachGroup, Vote, tally};
use crate::round::RoundRecord;
use serde::{Deserialize, Serialize};

/// Qualitative agreement level derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusLevel {
    None,
    Low,
    Medium,
    High,
    Unanimous,
}

impl ConsensusLevel {
    /// Band lookup with inclusive lower bounds
    pub fn from_score(score: u8) -> Self {
        match score {
            100.. => ConsensusLevel::Unanimous,
            75..=99 => ConsensusLevel::High,
            50..=74 => ConsensusLevel::Medium,
            25..=49 => ConsensusLevel::Low,
            _ => ConsensusLevel::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusLevel::None => "none",
            ConsensusLevel::Low => "low",
            ConsensusLevel::Medium => "medium",
            ConsensusLevel::High => "high",
            ConsensusLevel::Unanimous => "unanimous",
        }
    }
}

impl std::fmt::Display for ConsensusLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate view of one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Round this result was computed from
    pub round: u32,
    /// 0–100
    pub score: u8,
    pub level: ConsensusLevel,
    /// Non-error responses counted
    pub respondents: usize,
    pub confidence: ConfidenceStats,
    /// Approach groups, recommended group first
    pub tally: Vec<ApproachGroup>,
    pub recommended_approach: Option<String>,
    /// Members of the recommended group, in slot order
    pub supporting: Vec<String>,
    /// Other respondents, in slot order
    pub dissenting: Vec<String>,
    pub agreed_topics: Vec<String>,
    pub disagreed_topics: Vec<String>,
}

impl ConsensusResult {
    /// Result for a round with no usable answers
    pub fn empty(round: u32) -> Self {
        Self {
            round,
            score: 0,
            level: ConsensusLevel::None,
            respondents: 0,
            confidence: ConfidenceStats::default(),
            tally: Vec::new(),
            recommended_approach: None,
            supporting: Vec::new(),
            dissenting: Vec::new(),
            agreed_topics: Vec::new(),
            disagreed_topics: Vec::new(),
        }
    }

    pub fn from_round(round: &RoundRecord) -> Self {
        let votes: Vec<Vote> = round.slots().iter().filter_map(Vote::from_slot).collect();
        if votes.is_empty() {
            return Self::empty(round.round);
        }

        let tally = tally(&votes);
        let largest = tally.iter().map(ApproachGroup::size).max().unwrap_or(0);
        let ratio = largest as f64 / votes.len() as f64;
        let score = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;

        let scores: Vec<u8> = votes.iter().map(|v| v.confidence).collect();
        let confidence = ConfidenceStats::from_scores(&scores);

        let winner = tally.first();
        let (supporting, dissenting): (Vec<String>, Vec<String>) = votes
            .iter()
            .map(|v| v.agent.clone())
            .partition(|agent| winner.is_some_and(|g| g.contains(agent)));

        let answered: Vec<_> = round.answered().map(|s| &s.response).collect();
        let (agreed_topics, disagreed_topics) = classify_topics(&answered);

        Self {
            round: round.round,
            score,
            level: ConsensusLevel::from_score(score),
            respondents: votes.len(),
            confidence,
            recommended_approach: winner.map(|g| g.approach.clone()),
            tally,
            supporting,
            dissenting,
            agreed_topics,
            disagreed_topics,
        }
    }

    pub fn is_unanimous(&self) -> bool {
        self.level == ConsensusLevel::Unanimous
    }

    /// Visual vote summary, one mark per respondent: ● supporting, ○ dissenting
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        summary.extend(self.supporting.iter().map(|_| '●'));
        summary.extend(self.dissenting.iter().map(|_| '○'));
        summary.push(']');
        summary
    }
}

/// Compute the consensus of one round
pub fn consensus(round: &RoundRecord) -> ConsensusResult {
    ConsensusResult::from_round(round)
}
