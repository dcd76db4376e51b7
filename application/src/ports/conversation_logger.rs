//! Port for structured consultation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording consultation
//! events (rounds, agent answers, consensus, escalation, debate) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! consultation transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured consultation event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The logger adds the timestamp.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "round_started", "agent_response", "consensus").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging consultation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible; logging failures are dropped.
pub trait ConversationLogger: Send + Sync {
    /// Record a consultation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
