//! Consult use case
//!
//! The entry point of the engine. One consultation runs:
//!
//! 1. Routing: pick the panel for the task's category
//! 2. Cache lookup per agent (round 1 only)
//! 3. Round 1 dispatch for the agents the cache could not serve
//! 4. Consensus, then escalation of under-confident agents (at most once)
//! 5. Cache store of fresh, schema-conformant round 1 answers
//! 6. Optional debate rounds 2..K
//! 7. Final consensus over the last round and a verdict
//!
//! Cancellation before round 1 resolves is an error; after that, the
//! rounds completed so far come back as a partial result.

use super::debate::DebateController;
use super::dispatch::{DispatchError, DispatchRequest, Dispatcher};
use super::escalation::EscalationUseCase;
use crate::config::{ConsultOptions, CouncilConfig};
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::response_cache::{NoCache, ResponseCache};
use consilium_domain::routing::MIN_PANEL_SIZE;
use consilium_domain::{
    AgentSlot, AgentSpec, CacheKey, ConsensusResult, DebateSummary, DomainError, Fingerprint,
    PromptTemplate, RoundRecord, SlotSource, SlotStatus, Task, Verdict, consensus,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a consultation without a result
#[derive(Error, Debug)]
pub enum ConsultError {
    #[error("At least {min} participating agents are required, found {configured}", min = MIN_PANEL_SIZE)]
    InsufficientAgents { configured: usize },

    #[error("Consultation cancelled before the first round completed")]
    Cancelled,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for the Consult use case
#[derive(Debug, Clone)]
pub struct ConsultInput {
    pub task: Task,
    /// Candidate agents; routing narrows these to the panel
    pub agents: Vec<AgentSpec>,
    pub options: ConsultOptions,
}

impl ConsultInput {
    pub fn new(task: Task, agents: Vec<AgentSpec>) -> Self {
        Self {
            task,
            agents,
            options: ConsultOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConsultOptions) -> Self {
        self.options = options;
        self
    }
}

/// Everything a consultation produced
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationResult {
    pub fingerprint: Fingerprint,
    /// Completed rounds in order; round 1 first
    pub rounds: Vec<RoundRecord>,
    /// Consensus over the last completed round
    pub consensus: ConsensusResult,
    /// Present when a debate was run
    pub debate: Option<DebateSummary>,
    /// Status of every participant in the last round, in panel order
    pub agent_statuses: Vec<(String, SlotStatus)>,
    pub verdict: Verdict,
    /// Agents whose round 1 slot was replaced by a higher-capability variant
    pub escalated: Vec<String>,
    /// Agents served from the cache in round 1
    pub cache_hits: Vec<String>,
    /// The consultation was cancelled after round 1
    pub partial: bool,
}

impl ConsultationResult {
    pub fn final_round(&self) -> Option<&RoundRecord> {
        self.rounds.last()
    }

    pub fn failed_agents(&self) -> Vec<&str> {
        self.agent_statuses
            .iter()
            .filter(|(_, status)| *status == SlotStatus::Failed)
            .map(|(agent, _)| agent.as_str())
            .collect()
    }
}

/// Use case for running a full consultation
pub struct ConsultUseCase<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    config: CouncilConfig,
    cache: Arc<dyn ResponseCache>,
    logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: AgentGateway + 'static> ConsultUseCase<G> {
    pub fn new(gateway: Arc<G>, config: CouncilConfig) -> Self {
        Self {
            gateway,
            config,
            cache: Arc::new(NoCache),
            logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn config(&self) -> &CouncilConfig {
        &self.config
    }

    /// Execute with default (no-op) progress
    pub async fn execute(&self, input: ConsultInput) -> Result<ConsultationResult, ConsultError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ConsultInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ConsultationResult, ConsultError> {
        let ConsultInput { task, agents, options } = input;

        let panel: Vec<AgentSpec> = self
            .config
            .router()
            .select(task.category(), &agents)
            .into_iter()
            .cloned()
            .collect();
        if panel.len() < MIN_PANEL_SIZE {
            return Err(ConsultError::InsufficientAgents {
                configured: panel.len(),
            });
        }

        let fingerprint = Fingerprint::of(&task);
        info!(
            "Consulting {} agents on [{}] task {}",
            panel.len(),
            task.category(),
            fingerprint.short()
        );

        let dispatcher = self.dispatcher();

        // Round 1
        progress.on_round_start(1, panel.len());
        self.log_round_started(1, &panel);

        let cached = if options.enable_cache {
            self.lookup_cached(&fingerprint, &panel, progress).await
        } else {
            Vec::new()
        };
        let cache_hits: Vec<String> = cached.iter().map(|s| s.agent.clone()).collect();

        let requests: Vec<DispatchRequest> = panel
            .iter()
            .filter(|agent| !cache_hits.contains(&agent.name))
            .map(|agent| DispatchRequest::new(agent.clone(), PromptTemplate::initial_query(&task, agent)))
            .collect();

        let dispatched = if requests.is_empty() {
            debug!("Every agent served from cache; skipping dispatch");
            RoundRecord::new(1, Vec::new())?
        } else {
            match dispatcher.dispatch(1, requests, task.context(), progress).await {
                Ok(record) => record,
                Err(DispatchError::Cancelled) => return Err(ConsultError::Cancelled),
                Err(e) => return Err(e.into()),
            }
        };

        let mut first = Self::merge_first_round(&panel, cached, dispatched)?;
        let mut result = consensus(&first);
        self.log_round(&first, &result);
        progress.on_round_complete(1, &result);

        // Escalation
        let mut escalated = Vec::new();
        let mut partial = false;
        if options.enable_escalation {
            let escalation = EscalationUseCase::new(dispatcher.clone(), self.config.escalation().clone());
            match escalation.execute(&task, &panel, &first, &result, progress).await {
                Ok(outcome) => {
                    if !outcome.escalated.is_empty() {
                        self.logger.log(ConversationEvent::new(
                            "escalation",
                            json!({ "agents": outcome.escalated }),
                        ));
                        first = outcome.record;
                        result = consensus(&first);
                        self.log_round(&first, &result);
                        escalated = outcome.escalated;
                    }
                }
                Err(DispatchError::Cancelled) => {
                    warn!("Cancelled during escalation; returning round 1");
                    partial = true;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if options.enable_cache {
            self.store_fresh(&fingerprint, &first).await;
        }

        let mut rounds = vec![first];

        // Debate
        let mut debate = None;
        if options.enable_debate && !partial {
            let controller = DebateController::new(dispatcher, self.config.debate(), options.effective_rounds());
            let outcome = controller.run(&task, &panel, &rounds[0], progress).await?;
            for record in &outcome.rounds {
                self.log_round(record, &consensus(record));
            }
            self.logger.log(ConversationEvent::new(
                "debate_stopped",
                json!({
                    "rounds_run": outcome.summary.rounds_run,
                    "stop_reason": outcome.summary.stop_reason,
                    "position_changes": outcome.summary.total_position_changes(),
                }),
            ));
            partial = outcome.cancelled;
            rounds.extend(outcome.rounds);
            debate = Some(outcome.summary);
        }

        // Never empty: round 1 is always present
        let last = &rounds[rounds.len() - 1];
        let final_consensus = consensus(last);
        let verdict = options.strategy.verdict(&final_consensus);
        let agent_statuses = last.statuses();

        info!(
            "Consultation finished after {} round(s): {} ({}%)",
            rounds.len(),
            final_consensus.level,
            final_consensus.score
        );

        Ok(ConsultationResult {
            fingerprint,
            rounds,
            consensus: final_consensus,
            debate,
            agent_statuses,
            verdict,
            escalated,
            cache_hits,
            partial,
        })
    }

    fn dispatcher(&self) -> Dispatcher<G> {
        let dispatcher = Dispatcher::new(Arc::clone(&self.gateway))
            .with_normalizer(self.config.normalizer())
            .with_params(self.config.dispatch().clone());
        match &self.cancellation_token {
            Some(token) => dispatcher.with_cancellation(token.clone()),
            None => dispatcher,
        }
    }

    /// Cached round 1 slots for the panel. Cache failures read as misses.
    async fn lookup_cached(
        &self,
        fingerprint: &Fingerprint,
        panel: &[AgentSpec],
        progress: &dyn ProgressNotifier,
    ) -> Vec<AgentSlot> {
        let mut slots = Vec::new();
        for agent in panel {
            let key = CacheKey::new(fingerprint.clone(), agent.name.clone());
            match self.cache.lookup(&key).await {
                Ok(Some(response)) => {
                    debug!("Cache hit for {}", key);
                    progress.on_cache_hit(&agent.name);
                    progress.on_agent_complete(1, &agent.name, SlotStatus::Ok);
                    slots.push(AgentSlot::cached(agent.name.clone(), response));
                }
                Ok(None) => {}
                Err(e) => warn!("Cache lookup for {} failed, bypassing: {}", agent.name, e),
            }
        }
        slots
    }

    /// Round 1 in panel order from cached and dispatched slots
    fn merge_first_round(
        panel: &[AgentSpec],
        cached: Vec<AgentSlot>,
        dispatched: RoundRecord,
    ) -> Result<RoundRecord, DomainError> {
        let mut pool: Vec<AgentSlot> = cached.into_iter().chain(dispatched.into_slots()).collect();
        let slots = panel
            .iter()
            .filter_map(|agent| {
                let index = pool.iter().position(|s| s.agent == agent.name)?;
                Some(pool.swap_remove(index))
            })
            .collect();
        RoundRecord::new(1, slots)
    }

    /// Store answers that came from an adapter this time and followed the
    /// schema. Failures, degraded answers and cache hits are not stored.
    async fn store_fresh(&self, fingerprint: &Fingerprint, round: &RoundRecord) {
        let ttl = self.config.cache_ttl();
        for slot in round.slots() {
            let fresh = matches!(slot.source, SlotSource::Dispatched | SlotSource::Escalated);
            if !fresh || slot.degraded || slot.is_error() {
                continue;
            }
            let key = CacheKey::new(fingerprint.clone(), slot.agent.clone());
            if let Err(e) = self.cache.store(&key, &slot.response, ttl).await {
                warn!("Cache store for {} failed, bypassing: {}", slot.agent, e);
            }
        }
    }

    fn log_round_started(&self, round: u32, panel: &[AgentSpec]) {
        let agents: Vec<&str> = panel.iter().map(|a| a.name.as_str()).collect();
        self.logger.log(ConversationEvent::new(
            "round_started",
            json!({ "round": round, "agents": agents }),
        ));
    }

    fn log_round(&self, record: &RoundRecord, result: &ConsensusResult) {
        for slot in record.slots() {
            let event = match &slot.response.error {
                Some(error) => ConversationEvent::new(
                    "agent_failed",
                    json!({
                        "round": record.round,
                        "agent": slot.agent,
                        "error": error,
                        "attempts": slot.attempts,
                    }),
                ),
                None => ConversationEvent::new(
                    "agent_response",
                    json!({
                        "round": record.round,
                        "agent": slot.agent,
                        "model": slot.response.model,
                        "source": slot.source,
                        "degraded": slot.degraded,
                        "approach": slot.response.approach(),
                        "confidence": slot.response.score(),
                        "latency_ms": slot.response.metadata.latency_ms,
                    }),
                ),
            };
            self.logger.log(event);
        }
        self.logger.log(ConversationEvent::new(
            "consensus",
            json!({
                "round": result.round,
                "score": result.score,
                "level": result.level,
                "recommended_approach": result.recommended_approach,
                "mean_confidence": result.confidence.mean,
            }),
        ));
    }
}
