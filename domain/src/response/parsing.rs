//! Raw agent output and JSON extraction.
//!
//! Agents return either a structured JSON document or free text that may
//! contain one. These functions are pure text handling: no I/O, no
//! validation beyond "is this JSON".
//!
//! # Extraction order
//!
//! 1. The whole text parses as JSON
//! 2. A fenced code block (` ```json ... ``` ` or bare ` ``` `)
//! 3. The span from the first `{` to the last `}`

use serde_json::Value;

/// Raw output of one adapter call, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    Text(String),
    Json(Value),
}

impl RawOutput {
    /// Classify adapter stdout/body: JSON objects become [`RawOutput::Json`].
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(value @ Value::Object(_)) => RawOutput::Json(value),
            _ => RawOutput::Text(text),
        }
    }

    /// Verbatim text form (JSON is pretty-printed)
    pub fn as_text(&self) -> String {
        match self {
            RawOutput::Text(text) => text.clone(),
            RawOutput::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    /// Best-effort JSON object view of the output
    pub fn json_object(&self) -> Option<Value> {
        match self {
            RawOutput::Json(value @ Value::Object(_)) => Some(value.clone()),
            RawOutput::Json(_) => None,
            RawOutput::Text(text) => extract_json_object(text),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawOutput::Text(text) => text.trim().is_empty(),
            RawOutput::Json(Value::Null) => true,
            RawOutput::Json(_) => false,
        }
    }
}

/// Find a JSON object embedded in free text.
///
/// # Examples
///
/// ```
/// use consilium_domain::response::parsing::extract_json_object;
///
/// let text = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
/// assert_eq!(extract_json_object(text).unwrap()["a"], 1);
/// assert!(extract_json_object("no json here").is_none());
/// ```
pub fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Some(value) = parse_object(trimmed) {
        return Some(value);
    }

    if let Some(block) = fenced_block(trimmed)
        && let Some(value) = parse_object(block)
    {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&trimmed[start..=end])
}

fn parse_object(s: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(s.trim()) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Contents of the first fenced code block, with any language tag removed
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip the info string (e.g. "json") up to the end of the line
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}
