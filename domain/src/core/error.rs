//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("At least 2 agents are required for a consultation, {configured} configured")]
    InsufficientAgents { configured: usize },

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid agent: {0}")]
    InvalidAgent(String),

    #[error("Agent {0} appears more than once in a round")]
    DuplicateAgent(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = DomainError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_insufficient_agents_display() {
        let error = DomainError::InsufficientAgents { configured: 1 };
        assert_eq!(
            error.to_string(),
            "At least 2 agents are required for a consultation, 1 configured"
        );
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::InsufficientAgents { configured: 0 }.is_cancelled());
        assert!(!DomainError::InvalidTask("empty".to_string()).is_cancelled());
    }
}
