//! Agent adapters
//!
//! Thin I/O wrappers implementing the
//! [`AgentGateway`](consilium_application::AgentGateway) port:
//!
//! - [`CommandAgentAdapter`]: runs a local program, prompt on stdin
//! - [`HttpAgentAdapter`]: POSTs the prompt to an HTTP endpoint
//! - [`RoutingAgentGateway`]: picks the adapter configured for each agent

mod command;
mod http;
mod routing;

pub use command::CommandAgentAdapter;
pub use http::HttpAgentAdapter;
pub use routing::RoutingAgentGateway;

use consilium_domain::RawOutput;
use serde_json::Value;

/// Longest stderr / error body kept in an [`AdapterError`](consilium_application::AdapterError)
const MAX_ERROR_CHARS: usize = 2_000;

/// Token usage reported in a JSON answer, if any.
///
/// Recognizes `tokens_used`, `metadata.tokens_used`, and the
/// `usage.total_tokens` / `usage.input_tokens + usage.output_tokens`
/// shapes common to model CLIs.
pub(crate) fn tokens_used(raw: &RawOutput) -> Option<u64> {
    let value = raw.json_object()?;
    let direct = value
        .get("tokens_used")
        .or_else(|| value.pointer("/metadata/tokens_used"))
        .and_then(Value::as_u64);
    if direct.is_some() {
        return direct;
    }

    let usage = value.get("usage")?;
    usage.get("total_tokens").and_then(Value::as_u64).or_else(|| {
        let input = usage.get("input_tokens").and_then(Value::as_u64)?;
        let output = usage.get("output_tokens").and_then(Value::as_u64)?;
        Some(input.saturating_add(output))
    })
}

/// Prompt with the context blob appended, as sent to agents that take a
/// single text input
pub(crate) fn prompt_with_context(prompt: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("{}\n\n--- Context ---\n{}\n--- End of context ---\n", prompt, context),
        None => prompt.to_string(),
    }
}

pub(crate) fn truncate_error(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_ERROR_CHARS) {
        Some((index, _)) => format!("{}…", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}
