//! Dispatcher
//!
//! Sends one prompt per agent concurrently and resolves a full round.
//!
//! - One task per agent in a [`JoinSet`]; each attempt is bounded by the
//!   agent's own timeout.
//! - Timeouts and adapter errors are retried up to `max_retries` times with
//!   a fixed delay between attempts.
//! - An agent that never succeeds (or whose task panics) gets a synthetic
//!   failure response in its slot. One agent failing never fails the round.
//! - Slots come back in request order whatever order tasks finish in.

use crate::config::DispatchParams;
use crate::ports::agent_gateway::{AdapterError, AdapterOutput, AgentGateway};
use crate::ports::progress::ProgressNotifier;
use consilium_domain::{
    AgentResponse, AgentSlot, AgentSpec, DomainError, ResponseNormalizer, RoundRecord,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Dispatch cancelled")]
    Cancelled,

    #[error("Invalid round: {0}")]
    InvalidRound(#[from] DomainError),
}

/// One agent and the prompt it should answer
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub agent: AgentSpec,
    pub prompt: String,
}

impl DispatchRequest {
    pub fn new(agent: AgentSpec, prompt: impl Into<String>) -> Self {
        Self {
            agent,
            prompt: prompt.into(),
        }
    }
}

/// Outcome of all attempts for one agent
struct CallOutcome {
    result: Result<AdapterOutput, AdapterError>,
    attempts: u32,
    latency_ms: u64,
}

pub struct Dispatcher<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    normalizer: ResponseNormalizer,
    params: DispatchParams,
    cancellation_token: Option<CancellationToken>,
}

impl<G: AgentGateway + 'static> Clone for Dispatcher<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            normalizer: self.normalizer,
            params: self.params.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<G: AgentGateway + 'static> Dispatcher<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            normalizer: ResponseNormalizer::default(),
            params: DispatchParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: ResponseNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_params(mut self, params: DispatchParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Dispatch `requests` as round `round`.
    ///
    /// Returns a record with exactly one slot per request, in request order.
    /// Fails only on cancellation or when two requests name the same agent.
    pub async fn dispatch(
        &self,
        round: u32,
        requests: Vec<DispatchRequest>,
        context: Option<&str>,
        progress: &dyn ProgressNotifier,
    ) -> Result<RoundRecord, DispatchError> {
        info!("Round {}: dispatching to {} agents", round, requests.len());

        let mut join_set = JoinSet::new();
        let mut task_index = HashMap::new();
        let context: Option<Arc<str>> = context.map(Arc::from);

        for (index, request) in requests.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let agent = request.agent.clone();
            let prompt = request.prompt.clone();
            let context = context.clone();
            let retry_delay = self.params.retry_delay;

            let handle = join_set.spawn(async move {
                Self::call_with_retries(&gateway, &agent, &prompt, context.as_deref(), retry_delay).await
            });
            task_index.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<AgentSlot>> = vec![None; requests.len()];

        loop {
            let next = match &self.cancellation_token {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        warn!("Round {} cancelled with {} agents outstanding", round, join_set.len());
                        join_set.abort_all();
                        return Err(DispatchError::Cancelled);
                    }
                    next = join_set.join_next_with_id() => next,
                },
                None => join_set.join_next_with_id().await,
            };

            let Some(joined) = next else {
                break;
            };

            let (index, slot) = match joined {
                Ok((id, outcome)) => {
                    let Some(&index) = task_index.get(&id) else {
                        continue;
                    };
                    (index, self.build_slot(round, &requests[index].agent, outcome))
                }
                Err(e) => {
                    let Some(&index) = task_index.get(&e.id()) else {
                        continue;
                    };
                    let agent = &requests[index].agent;
                    warn!("Agent {} task failed: {}", agent.name, e);
                    let response = AgentResponse::failure(
                        agent.name.clone(),
                        agent.model_label(),
                        round,
                        format!("agent task failed: {}", e),
                    );
                    (index, AgentSlot::dispatched(agent.name.clone(), response, false, 0))
                }
            };

            progress.on_agent_complete(round, &slot.agent, slot.status());
            slots[index] = Some(slot);
        }

        let slots = slots
            .into_iter()
            .zip(&requests)
            .map(|(slot, request)| {
                slot.unwrap_or_else(|| {
                    let agent = &request.agent;
                    let response =
                        AgentResponse::failure(agent.name.clone(), agent.model_label(), round, "agent task lost");
                    AgentSlot::dispatched(agent.name.clone(), response, false, 0)
                })
            })
            .collect();

        let record = RoundRecord::new(round, slots)?;
        info!(
            "Round {} resolved: {} answered, {} failed",
            round,
            record.answered().count(),
            record.failed_count()
        );
        Ok(record)
    }

    /// Invoke one agent, retrying timeouts and adapter errors
    async fn call_with_retries(
        gateway: &G,
        agent: &AgentSpec,
        prompt: &str,
        context: Option<&str>,
        retry_delay: std::time::Duration,
    ) -> CallOutcome {
        let timeout = agent.timeout();
        let max_attempts = agent.max_retries.saturating_add(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let started = Instant::now();

            let result = match tokio::time::timeout(timeout, gateway.invoke(agent, prompt, context, timeout)).await {
                Ok(result) => result,
                Err(_) => Err(AdapterError::Timeout(timeout)),
            };
            let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(output) => {
                    debug!("Agent {} answered in {}ms (attempt {})", agent.name, latency_ms, attempts);
                    return CallOutcome {
                        result: Ok(output),
                        attempts,
                        latency_ms,
                    };
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Agent {} attempt {}/{} failed: {}; retrying",
                        agent.name, attempts, max_attempts, e
                    );
                    tokio::time::sleep(retry_delay).await;
                }
                Err(e) => {
                    warn!("Agent {} failed after {} attempts: {}", agent.name, attempts, e);
                    return CallOutcome {
                        result: Err(e),
                        attempts,
                        latency_ms,
                    };
                }
            }
        }
    }

    fn build_slot(&self, round: u32, agent: &AgentSpec, outcome: CallOutcome) -> AgentSlot {
        match outcome.result {
            Ok(output) => {
                let normalized = self.normalizer.normalize(agent, &output.raw);
                let degraded = normalized.is_degraded();
                if degraded {
                    debug!("Agent {} returned non-standard output", agent.name);
                }
                let response = normalized
                    .into_response()
                    .with_metadata(round, outcome.latency_ms, output.tokens_used);
                AgentSlot::dispatched(agent.name.clone(), response, degraded, outcome.attempts)
            }
            Err(e) => {
                let mut response =
                    AgentResponse::failure(agent.name.clone(), agent.model_label(), round, e.to_string());
                response.metadata.latency_ms = outcome.latency_ms;
                AgentSlot::dispatched(agent.name.clone(), response, false, outcome.attempts)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted behavior for one call
    #[derive(Debug, Clone)]
    pub enum Reply {
        /// Answer with this JSON/text after `delay`
        After(Duration, String),
        Fail(AdapterError),
        Panic,
    }

    /// JSON answer in the response schema
    pub fn schema_answer(approach: &str, score: u8) -> String {
        serde_json::json!({
            "response": {
                "summary": format!("go with {}", approach),
                "detailed": format!("because {} fits", approach),
                "approach": approach,
                "pros": [],
                "cons": [],
                "caveats": []
            },
            "confidence": { "score": score, "reasoning": "experience" }
        })
        .to_string()
    }

    /// Gateway replaying scripted replies per agent name (model-qualified
    /// keys `name@model` take precedence), recording every call
    #[derive(Default)]
    pub struct MockGateway {
        replies: Mutex<HashMap<String, VecDeque<Reply>>>,
        pub calls: Mutex<Vec<(String, String)>>,
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script(self, key: &str, replies: Vec<Reply>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .insert(key.to_string(), replies.into());
            self
        }

        pub fn answering(self, key: &str, approach: &str, score: u8) -> Self {
            self.script(key, vec![Reply::After(Duration::ZERO, schema_answer(approach, score))])
        }

        pub fn call_count(&self, agent: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|(a, _)| a == agent).count()
        }

        pub fn prompts_for(&self, agent: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(a, _)| a == agent)
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    #[async_trait]
    impl AgentGateway for MockGateway {
        async fn invoke(
            &self,
            agent: &AgentSpec,
            prompt: &str,
            _context: Option<&str>,
            _timeout: Duration,
        ) -> Result<AdapterOutput, AdapterError> {
            self.calls
                .lock()
                .unwrap()
                .push((agent.name.clone(), prompt.to_string()));

            let qualified = format!("{}@{}", agent.name, agent.model_label());
            let reply = {
                let mut replies = self.replies.lock().unwrap();
                let queue = if replies.contains_key(&qualified) {
                    replies.get_mut(&qualified)
                } else {
                    replies.get_mut(&agent.name)
                };
                match queue {
                    // The last scripted reply repeats
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            };

            match reply {
                Some(Reply::After(delay, text)) => {
                    tokio::time::sleep(delay).await;
                    Ok(AdapterOutput::text(text))
                }
                Some(Reply::Fail(e)) => Err(e),
                Some(Reply::Panic) => panic!("scripted panic"),
                None => Err(AdapterError::NotConfigured(agent.name.clone())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::ports::progress::NoProgress;
    use consilium_domain::{SlotSource, SlotStatus};
    use std::time::Duration;

    fn agent(name: &str) -> AgentSpec {
        AgentSpec::new(name).with_timeout_seconds(5).with_max_retries(1)
    }

    fn requests(names: &[&str]) -> Vec<DispatchRequest> {
        names
            .iter()
            .map(|n| DispatchRequest::new(agent(n), format!("prompt for {}", n)))
            .collect()
    }

    fn dispatcher(gateway: MockGateway) -> (Arc<MockGateway>, Dispatcher<MockGateway>) {
        let gateway = Arc::new(gateway);
        let dispatcher = Dispatcher::new(Arc::clone(&gateway))
            .with_params(DispatchParams::default().with_retry_delay(Duration::from_millis(100)));
        (gateway, dispatcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_slots_follow_request_order() {
        let gateway = MockGateway::new()
            .script("slow", vec![Reply::After(Duration::from_secs(3), schema_answer("x", 7))])
            .script("fast", vec![Reply::After(Duration::from_millis(10), schema_answer("y", 6))]);
        let (_, dispatcher) = dispatcher(gateway);

        let record = dispatcher
            .dispatch(1, requests(&["slow", "fast"]), None, &NoProgress)
            .await
            .unwrap();

        assert_eq!(record.agents().collect::<Vec<_>>(), vec!["slow", "fast"]);
        assert_eq!(record.slot("slow").unwrap().response.approach(), "x");
        assert_eq!(record.slot("fast").unwrap().response.metadata.round, 1);
        assert_eq!(record.slot("slow").unwrap().response.metadata.latency_ms, 3_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_agent_failing_still_fills_every_slot() {
        let gateway = MockGateway::new()
            .script("a", vec![Reply::Fail(AdapterError::Transport("refused".into()))])
            .script("b", vec![Reply::After(Duration::from_secs(60), schema_answer("x", 5))])
            .script("c", vec![Reply::Panic]);
        let (gateway, dispatcher) = dispatcher(gateway);

        let record = dispatcher
            .dispatch(1, requests(&["a", "b", "c"]), None, &NoProgress)
            .await
            .unwrap();

        assert_eq!(record.len(), 3);
        for slot in record.slots() {
            assert!(slot.is_error(), "{} should have failed", slot.agent);
            assert_eq!(slot.response.score(), 0);
            assert_eq!(slot.status(), SlotStatus::Failed);
        }
        // first attempt + one retry each
        assert_eq!(gateway.call_count("a"), 2);
        assert_eq!(gateway.call_count("b"), 2);
        assert_eq!(record.slot("a").unwrap().attempts, 2);
        assert!(
            record.slot("b").unwrap().response.error.as_deref().unwrap().contains("Timed out")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let gateway = MockGateway::new().script(
            "flaky",
            vec![
                Reply::Fail(AdapterError::Process {
                    exit_code: Some(1),
                    stderr: "rate limited".into(),
                }),
                Reply::After(Duration::ZERO, schema_answer("x", 8)),
            ],
        );
        let (gateway, dispatcher) = dispatcher(gateway.answering("other", "x", 6));

        let record = dispatcher
            .dispatch(1, requests(&["flaky", "other"]), None, &NoProgress)
            .await
            .unwrap();

        let slot = record.slot("flaky").unwrap();
        assert!(!slot.is_error());
        assert_eq!(slot.attempts, 2);
        assert_eq!(slot.source, SlotSource::Dispatched);
        assert_eq!(gateway.call_count("flaky"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_standard_output_is_degraded_not_failed() {
        let gateway = MockGateway::new()
            .script("chatty", vec![Reply::After(Duration::ZERO, "I would just use cron.".into())])
            .answering("strict", "cron", 7);
        let (_, dispatcher) = dispatcher(gateway);

        let record = dispatcher
            .dispatch(1, requests(&["chatty", "strict"]), None, &NoProgress)
            .await
            .unwrap();

        let chatty = record.slot("chatty").unwrap();
        assert!(chatty.degraded);
        assert!(!chatty.is_error());
        assert_eq!(chatty.response.response.detailed, "I would just use cron.");
        assert_eq!(chatty.response.score(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_round() {
        let gateway = MockGateway::new()
            .script("a", vec![Reply::After(Duration::from_secs(30), schema_answer("x", 7))])
            .script("b", vec![Reply::After(Duration::from_secs(30), schema_answer("x", 7))]);
        let token = CancellationToken::new();
        let (_, dispatcher) = dispatcher(gateway);
        let dispatcher = dispatcher.with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });

        let result = dispatcher
            .dispatch(1, requests(&["a", "b"]), None, &NoProgress)
            .await;
        canceller.await.unwrap();

        assert!(matches!(result, Err(DispatchError::Cancelled)));
    }

    #[tokio::test]
    async fn test_duplicate_agents_rejected() {
        let (_, dispatcher) = dispatcher(MockGateway::new().answering("a", "x", 5));
        let result = dispatcher
            .dispatch(1, requests(&["a", "a"]), None, &NoProgress)
            .await;
        assert!(matches!(result, Err(DispatchError::InvalidRound(_))));
    }
}
