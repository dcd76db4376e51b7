//! HTTP endpoint adapter
//!
//! POSTs `{agent, model, persona, prompt, context}` as JSON and reads the
//! answer from the response body. A body with a string `output`, `text` or
//! `content` field is unwrapped to that text; any other body is the answer
//! as-is.

use super::{tokens_used, truncate_error};
use async_trait::async_trait;
use consilium_application::{AdapterError, AdapterOutput, AgentGateway};
use consilium_domain::{AgentSpec, RawOutput};
use serde_json::{Value, json};
use std::time::Duration;

const USER_AGENT: &str = concat!("consilium/", env!("CARGO_PKG_VERSION"));

/// Fields that carry the answer text in a wrapper body
const TEXT_FIELDS: [&str; 3] = ["output", "text", "content"];

#[derive(Debug, Clone)]
pub struct HttpAgentAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAgentAdapter {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Sent as a bearer token
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn request_body(agent: &AgentSpec, prompt: &str, context: Option<&str>) -> Value {
        json!({
            "agent": agent.name,
            "model": agent.model,
            "persona": agent.persona,
            "prompt": prompt,
            "context": context,
        })
    }
}

/// Answer carried by a response body
fn answer_from_body(body: &str) -> RawOutput {
    let raw = RawOutput::from_text(body);
    if let RawOutput::Json(value) = &raw
        && let Some(text) = TEXT_FIELDS
            .iter()
            .find_map(|field| value.get(*field).and_then(Value::as_str))
    {
        return RawOutput::from_text(text);
    }
    raw
}

#[async_trait]
impl AgentGateway for HttpAgentAdapter {
    async fn invoke(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        context: Option<&str>,
        timeout: Duration,
    ) -> Result<AdapterOutput, AdapterError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("User-Agent", USER_AGENT)
            .timeout(timeout)
            .json(&Self::request_body(agent, prompt, context));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AdapterError::Timeout(timeout)
            } else {
                AdapterError::Transport(format!("request to {} failed: {}", self.endpoint, e))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AdapterError::Timeout(timeout)
            } else {
                AdapterError::Transport(format!("reading response from {} failed: {}", self.endpoint, e))
            }
        })?;

        if !status.is_success() {
            return Err(AdapterError::Transport(format!(
                "HTTP error: {} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                truncate_error(&body)
            )));
        }

        // Usage may sit on the wrapper rather than on the answer itself
        let envelope = RawOutput::from_text(body.as_str());
        let raw = answer_from_body(&body);
        let tokens = tokens_used(&raw).or_else(|| tokens_used(&envelope));
        Ok(AdapterOutput { raw, tokens_used: tokens })
    }
}
