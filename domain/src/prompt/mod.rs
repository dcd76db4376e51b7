//! Prompt domain
//!
//! Templates for the round 1 question and for debate rounds.

mod template;

pub use template::{PeerView, PromptTemplate, peer_label};
