//! Routing and escalation policy

pub mod escalation;
pub mod participants;

pub use escalation::{DEFAULT_ESCALATION_THRESHOLD, EscalationPolicy};
pub use participants::{CategoryRoute, MIN_PANEL_SIZE, ParticipantRouter};
