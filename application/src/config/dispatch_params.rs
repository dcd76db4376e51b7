//! Dispatch parameters: retry pacing for the dispatcher.
//!
//! Per-agent timeouts and retry counts live on each
//! [`AgentSpec`](consilium_domain::AgentSpec); this holds what is shared.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default pause between attempts for the same agent
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchParams {
    /// Fixed delay between a failed attempt and the next one
    pub retry_delay: Duration,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl DispatchParams {
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}
