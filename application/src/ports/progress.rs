//! Progress notification port
//!
//! Defines the interface for reporting progress during a consultation.

use consilium_domain::{ConsensusResult, SlotStatus};

/// Callback for progress updates during a consultation
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a round starts dispatching
    fn on_round_start(&self, round: u32, total_agents: usize);

    /// Called when one agent's slot in a round resolves
    fn on_agent_complete(&self, round: u32, agent: &str, status: SlotStatus);

    /// Called when a round resolves, with its consensus
    fn on_round_complete(&self, round: u32, consensus: &ConsensusResult);

    /// Called when an agent's answer is served from the cache
    fn on_cache_hit(&self, _agent: &str) {}

    /// Called before low-confidence agents are re-dispatched
    fn on_escalation(&self, _agents: &[String]) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_round_start(&self, _round: u32, _total_agents: usize) {}
    fn on_agent_complete(&self, _round: u32, _agent: &str, _status: SlotStatus) {}
    fn on_round_complete(&self, _round: u32, _consensus: &ConsensusResult) {}
}
