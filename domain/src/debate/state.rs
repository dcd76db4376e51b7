//! Debate state machine
//!
//! ```text
//!   round 1 resolved
//!         │
//!         ▼
//!  AwaitingRound(2) ──continue──► AwaitingRound(3) ──► … ──► AwaitingRound(K)
//!         │                              │                          │
//!         └────────── stop ──────────────┴──────────────────────────┴──► Done
//! ```
//!
//! The state only records what happened (position changes, critiques,
//! stop reason). Dispatching the rounds is the controller's job.

use super::policy::{Continuation, StopReason};
use super::turn::CritiqueSeverity;
use crate::round::{RoundRecord, SlotSource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Where the debate stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Waiting for round `k` (2..=K) to be dispatched
    AwaitingRound(u32),
    Done,
}

/// A critique as recorded by the controller, with the target resolved to
/// an agent name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedCritique {
    pub round: u32,
    pub from: String,
    pub target: String,
    pub severity: CritiqueSeverity,
    pub point: String,
}

/// Debate progress for one consultation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateState {
    phase: DebatePhase,
    max_rounds: u32,
    last_round: u32,
    position_changes: BTreeMap<String, Vec<bool>>,
    critiques: Vec<RecordedCritique>,
    stop_reason: Option<StopReason>,
}

impl DebateState {
    /// State right after round 1 resolved.
    ///
    /// With `max_rounds <= 1` there is nothing to debate and the state
    /// starts in [`DebatePhase::Done`].
    pub fn new(max_rounds: u32) -> Self {
        let (phase, stop_reason) = if max_rounds >= 2 {
            (DebatePhase::AwaitingRound(2), None)
        } else {
            (DebatePhase::Done, Some(StopReason::MaxRounds))
        };
        Self {
            phase,
            max_rounds,
            last_round: 1,
            position_changes: BTreeMap::new(),
            critiques: Vec::new(),
            stop_reason,
        }
    }

    pub fn phase(&self) -> DebatePhase {
        self.phase
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Last round that resolved (1 until a debate round completes)
    pub fn last_round(&self) -> u32 {
        self.last_round
    }

    pub fn is_done(&self) -> bool {
        self.phase == DebatePhase::Done
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Round to dispatch next, if any
    pub fn next_round(&self) -> Option<u32> {
        match self.phase {
            DebatePhase::AwaitingRound(k) => Some(k),
            DebatePhase::Done => None,
        }
    }

    /// Apply the policy decision taken after the last resolved round
    pub fn apply(&mut self, decision: Continuation) {
        if self.is_done() {
            return;
        }
        match decision {
            Continuation::Continue if self.last_round < self.max_rounds => {
                self.phase = DebatePhase::AwaitingRound(self.last_round + 1);
            }
            Continuation::Continue => self.finish(StopReason::MaxRounds),
            Continuation::Stop(reason) => self.finish(reason),
        }
    }

    /// Record a resolved debate round.
    ///
    /// `labels` maps the peer labels shown in prompts back to agent names;
    /// targets that are not in the map are recorded as given.
    /// Carried-forward slots contribute nothing: the agent did not answer.
    pub fn record_round(&mut self, record: &RoundRecord, labels: &HashMap<String, String>) {
        self.last_round = record.round;
        for slot in record.slots() {
            let changed = slot.source == SlotSource::Dispatched
                && !slot.is_error()
                && slot.response.debate.as_ref().is_some_and(|d| d.position_changed);
            self.position_changes
                .entry(slot.agent.clone())
                .or_default()
                .push(changed);

            if slot.source != SlotSource::Dispatched {
                continue;
            }
            let Some(turn) = &slot.response.debate else {
                continue;
            };
            for critique in &turn.critiques {
                let target = labels
                    .get(critique.target.trim())
                    .cloned()
                    .unwrap_or_else(|| critique.target.trim().to_string());
                self.critiques.push(RecordedCritique {
                    round: record.round,
                    from: slot.agent.clone(),
                    target,
                    severity: critique.severity,
                    point: critique.point.clone(),
                });
            }
        }
    }

    /// Mark the debate finished
    pub fn finish(&mut self, reason: StopReason) {
        self.phase = DebatePhase::Done;
        self.stop_reason = Some(reason);
    }

    pub fn critiques(&self) -> &[RecordedCritique] {
        &self.critiques
    }

    /// Number of debate rounds in which `agent` changed position
    pub fn position_change_count(&self, agent: &str) -> usize {
        self.position_changes
            .get(agent)
            .map(|rounds| rounds.iter().filter(|&&c| c).count())
            .unwrap_or(0)
    }

    pub fn summary(&self) -> DebateSummary {
        DebateSummary {
            rounds_run: self.last_round,
            max_rounds: self.max_rounds,
            stop_reason: self.stop_reason,
            position_changes: self
                .position_changes
                .keys()
                .map(|agent| (agent.clone(), self.position_change_count(agent)))
                .collect(),
            critiques: self.critiques.clone(),
        }
    }
}

/// What a finished debate reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateSummary {
    /// Total rounds that resolved, including round 1
    pub rounds_run: u32,
    pub max_rounds: u32,
    pub stop_reason: Option<StopReason>,
    /// Agent name → number of rounds in which it changed position
    pub position_changes: BTreeMap<String, usize>,
    pub critiques: Vec<RecordedCritique>,
}

impl DebateSummary {
    pub fn total_position_changes(&self) -> usize {
        self.position_changes.values().sum()
    }
}
