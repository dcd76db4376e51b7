//! Rounds: one synchronized batch of agent answers.

pub mod record;

pub use record::{AgentSlot, RoundRecord, SlotSource, SlotStatus};

#[cfg(test)]
pub(crate) use record::test_support;
