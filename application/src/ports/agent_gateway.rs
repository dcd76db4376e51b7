//! Agent Gateway port
//!
//! Defines the interface for invoking one agent with one prompt.

use async_trait::async_trait;
use consilium_domain::{AgentSpec, RawOutput};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a single agent invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Process exited ({}): {stderr}", exit_label(.exit_code))]
    Process {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Agent not configured: {0}")]
    NotConfigured(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "killed by signal".to_string(),
    }
}

/// What an adapter got back from its agent
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterOutput {
    pub raw: RawOutput,
    /// Token usage, when the agent reports it
    pub tokens_used: Option<u64>,
}

impl AdapterOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            raw: RawOutput::from_text(text),
            tokens_used: None,
        }
    }

    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens_used = Some(tokens);
        self
    }
}

/// Gateway for agent communication
///
/// This port defines how the application layer reaches an agent. Adapters
/// (local program, HTTP endpoint) live in the infrastructure layer and
/// should honor `timeout` themselves; the dispatcher also enforces it.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn invoke(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        context: Option<&str>,
        timeout: Duration,
    ) -> Result<AdapterOutput, AdapterError>;
}
