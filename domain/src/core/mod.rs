//! Core domain concepts shared across all subdomains.
//!
//! - [`task::Task`]: the validated task posed to every agent
//! - [`clock::Clock`]: source of wall-clock milliseconds
//! - [`error::DomainError`]: domain-level errors

pub mod clock;
pub mod error;
pub mod string;
pub mod task;
