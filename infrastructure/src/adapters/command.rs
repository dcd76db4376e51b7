//! Local program adapter
//!
//! Runs the configured program once per call. The prompt (with any context
//! appended) goes to stdin; stdout is the answer. `{model}` in an argument
//! is replaced with the agent's model label, so one entry can serve both
//! the normal and the escalated variant.

use super::{prompt_with_context, tokens_used, truncate_error};
use async_trait::async_trait;
use consilium_application::{AdapterError, AdapterOutput, AgentGateway};
use consilium_domain::{AgentSpec, RawOutput};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

const MODEL_PLACEHOLDER: &str = "{model}";

#[derive(Debug, Clone)]
pub struct CommandAgentAdapter {
    program: String,
    args: Vec<String>,
}

impl CommandAgentAdapter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn command(&self, agent: &AgentSpec) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(
                self.args
                    .iter()
                    .map(|arg| arg.replace(MODEL_PLACEHOLDER, agent.model_label())),
            )
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl AgentGateway for CommandAgentAdapter {
    async fn invoke(
        &self,
        agent: &AgentSpec,
        prompt: &str,
        context: Option<&str>,
        timeout: Duration,
    ) -> Result<AdapterOutput, AdapterError> {
        let mut child = self.command(agent).spawn().map_err(|e| {
            AdapterError::Transport(format!("failed to start '{}': {}", self.program, e))
        })?;

        // Fed from its own task so a chatty child cannot block on a full stdout
        // pipe while we are still writing
        if let Some(mut stdin) = child.stdin.take() {
            let input = prompt_with_context(prompt, context);
            let name = agent.name.clone();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    debug!("Agent {} closed stdin early: {}", name, e);
                }
            });
        }

        // Dropping the future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(AdapterError::Transport(format!(
                    "failed waiting for '{}': {}",
                    self.program, e
                )));
            }
            Err(_) => {
                warn!("Agent {} ({}) timed out; process killed", agent.name, self.program);
                return Err(AdapterError::Timeout(timeout));
            }
        };

        if !output.status.success() {
            return Err(AdapterError::Process {
                exit_code: output.status.code(),
                stderr: truncate_error(&String::from_utf8_lossy(&output.stderr)),
            });
        }

        let raw = RawOutput::from_text(String::from_utf8_lossy(&output.stdout));
        let tokens = tokens_used(&raw);
        Ok(AdapterOutput { raw, tokens_used: tokens })
    }
}
