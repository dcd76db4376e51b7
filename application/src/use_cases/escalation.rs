//! Escalation
//!
//! When the panel as a whole is under-confident, re-asks the
//! under-confident agents through their higher-capability variants. The
//! round keeps its shape: successful escalated answers replace the
//! original slot, failed ones leave it untouched.

use super::dispatch::{DispatchError, DispatchRequest, Dispatcher};
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::ProgressNotifier;
use consilium_domain::{
    AgentSpec, ConsensusResult, EscalationPolicy, PromptTemplate, RoundRecord, SlotSource, Task,
};
use tracing::{info, warn};

/// Round after escalation and the agents whose slots were replaced
#[derive(Debug, Clone)]
pub struct EscalationOutcome {
    pub record: RoundRecord,
    pub escalated: Vec<String>,
}

pub struct EscalationUseCase<G: AgentGateway + 'static> {
    dispatcher: Dispatcher<G>,
    policy: EscalationPolicy,
}

impl<G: AgentGateway + 'static> EscalationUseCase<G> {
    pub fn new(dispatcher: Dispatcher<G>, policy: EscalationPolicy) -> Self {
        Self { dispatcher, policy }
    }

    /// Escalate within `round` if its consensus calls for it.
    ///
    /// Returns the round unchanged (and nothing escalated) when the policy
    /// declines or no agent has a higher-capability variant.
    pub async fn execute(
        &self,
        task: &Task,
        agents: &[AgentSpec],
        round: &RoundRecord,
        consensus: &ConsensusResult,
        progress: &dyn ProgressNotifier,
    ) -> Result<EscalationOutcome, DispatchError> {
        let unchanged = || EscalationOutcome {
            record: round.clone(),
            escalated: Vec::new(),
        };

        if !self.policy.should_escalate(consensus) {
            return Ok(unchanged());
        }

        let variants = self.policy.select(round, agents);
        if variants.is_empty() {
            info!(
                "Mean confidence {:.1} is below {:.1} but no agent can escalate",
                consensus.confidence.mean, self.policy.confidence_threshold
            );
            return Ok(unchanged());
        }

        let names: Vec<String> = variants.iter().map(|a| a.name.clone()).collect();
        info!("Escalating {} agent(s): {}", names.len(), names.join(", "));
        progress.on_escalation(&names);

        let requests = variants
            .into_iter()
            .map(|agent| {
                let prompt = PromptTemplate::initial_query(task, &agent);
                DispatchRequest::new(agent, prompt)
            })
            .collect();

        let escalated_round = self
            .dispatcher
            .dispatch(round.round, requests, task.context(), progress)
            .await?;

        let mut record = round.clone();
        let mut escalated = Vec::new();
        for slot in escalated_round.into_slots() {
            if slot.is_error() {
                warn!("Escalation of {} failed; keeping original answer", slot.agent);
                continue;
            }
            let name = slot.agent.clone();
            let mut slot = slot;
            slot.source = SlotSource::Escalated;
            if let Some(replaced) = record.with_slot_replaced(slot) {
                record = replaced;
                escalated.push(name);
            }
        }

        Ok(EscalationOutcome { record, escalated })
    }
}
