//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod consult;
pub mod debate;
pub mod dispatch;
pub mod escalation;
