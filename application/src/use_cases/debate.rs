//! Debate controller
//!
//! Runs rounds 2..K after round 1 resolved. Each round every agent that
//! answered the previous round sees its own prior answer and its peers'
//! summaries, and answers again with a `debate` sub-object. The
//! [`ContinuationPolicy`] decides after each round whether to go on.
//!
//! Agents that fail a debate round keep their previous slot, carried
//! forward, so the panel never shrinks.

use super::dispatch::{DispatchError, DispatchRequest, Dispatcher};
use crate::config::DebateConfig;
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::ProgressNotifier;
use consilium_domain::prompt::peer_label;
use consilium_domain::{
    AgentSlot, AgentSpec, ContinuationPolicy, DebateState, DebateSummary, PeerView, PromptTemplate,
    RoundRecord, StopReason, Task, consensus,
};
use std::collections::HashMap;
use tracing::{debug, info};

/// Rounds produced by a debate
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    /// Debate rounds in order (round 1 is not included)
    pub rounds: Vec<RoundRecord>,
    pub summary: DebateSummary,
    /// A round was aborted; `rounds` holds only the completed ones
    pub cancelled: bool,
}

pub struct DebateController<G: AgentGateway + 'static> {
    dispatcher: Dispatcher<G>,
    policy: ContinuationPolicy,
    anonymize_peers: bool,
}

impl<G: AgentGateway + 'static> DebateController<G> {
    pub fn new(dispatcher: Dispatcher<G>, config: &DebateConfig, max_rounds: u32) -> Self {
        Self {
            dispatcher,
            policy: config.policy(max_rounds),
            anonymize_peers: config.anonymize_peers,
        }
    }

    /// Debate from `first` (round 1) until the policy stops or the round
    /// limit is reached.
    pub async fn run(
        &self,
        task: &Task,
        agents: &[AgentSpec],
        first: &RoundRecord,
        progress: &dyn ProgressNotifier,
    ) -> Result<DebateOutcome, DispatchError> {
        let mut state = DebateState::new(self.policy.max_rounds);
        let mut rounds: Vec<RoundRecord> = Vec::new();
        let mut cancelled = false;

        if !state.is_done() {
            state.apply(self.policy.decide(1, &consensus(first), task.category()));
        }

        while let Some(round) = state.next_round() {
            let previous = rounds.last().unwrap_or(first);
            let labels = self.peer_labels(previous);
            let requests = self.build_requests(task, agents, previous, round, &labels);

            info!("Debate round {} with {} agents", round, requests.len());
            progress.on_round_start(round, requests.len());

            let dispatched = match self
                .dispatcher
                .dispatch(round, requests, task.context(), progress)
                .await
            {
                Ok(record) => record,
                Err(DispatchError::Cancelled) => {
                    state.finish(StopReason::Cancelled);
                    cancelled = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            let merged = Self::merge(round, previous, dispatched)?;
            let label_to_agent: HashMap<String, String> =
                labels.iter().map(|(agent, label)| (label.clone(), agent.clone())).collect();
            state.record_round(&merged, &label_to_agent);

            let result = consensus(&merged);
            progress.on_round_complete(round, &result);
            state.apply(self.policy.decide(round, &result, task.category()));

            rounds.push(merged);
        }

        if let Some(reason) = state.stop_reason() {
            info!("Debate stopped after round {}: {}", state.last_round(), reason);
        }

        Ok(DebateOutcome {
            rounds,
            summary: state.summary(),
            cancelled,
        })
    }

    /// Agent name → label shown to peers, for every agent that answered
    fn peer_labels(&self, previous: &RoundRecord) -> HashMap<String, String> {
        previous
            .answered()
            .enumerate()
            .map(|(i, slot)| {
                let label = if self.anonymize_peers {
                    peer_label(i)
                } else {
                    slot.agent.clone()
                };
                (slot.agent.clone(), label)
            })
            .collect()
    }

    fn build_requests(
        &self,
        task: &Task,
        agents: &[AgentSpec],
        previous: &RoundRecord,
        round: u32,
        labels: &HashMap<String, String>,
    ) -> Vec<DispatchRequest> {
        previous
            .answered()
            .filter_map(|own| {
                let agent = agents.iter().find(|a| a.name == own.agent)?;
                let peers: Vec<PeerView> = previous
                    .answered()
                    .filter(|peer| peer.agent != own.agent)
                    .map(|peer| PeerView {
                        label: labels.get(&peer.agent).cloned().unwrap_or_else(|| peer.agent.clone()),
                        summary: peer.response.summary().to_string(),
                    })
                    .collect();
                let prompt = PromptTemplate::debate_prompt(task, agent, round, &own.response, &peers);
                Some(DispatchRequest::new(agent.clone(), prompt))
            })
            .collect()
    }

    /// Previous slots in order, replaced by this round's answers where the
    /// agent answered
    fn merge(round: u32, previous: &RoundRecord, dispatched: RoundRecord) -> Result<RoundRecord, DispatchError> {
        let slots: Vec<AgentSlot> = previous
            .slots()
            .iter()
            .map(|prior| match dispatched.slot(&prior.agent) {
                Some(fresh) if !fresh.is_error() => fresh.clone(),
                _ => {
                    debug!("Agent {} carried forward into round {}", prior.agent, round);
                    prior.carried_forward()
                }
            })
            .collect();
        Ok(RoundRecord::new(round, slots)?)
    }
}
