//! Agent descriptors: who sits on the panel and at which capability tier.

pub mod spec;

pub use spec::{AgentSpec, CapabilityTier};
