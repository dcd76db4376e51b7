//! Task value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Category label used when the caller does not supply one
pub const DEFAULT_CATEGORY: &str = "general";

/// A task to be answered by every agent on the panel (Value Object)
///
/// Holds the free-text prompt, an optional context blob (e.g. the contents
/// of a file the question is about), and a category label. The category
/// only drives routing and debate policy; it never changes how answers are
/// scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    prompt: String,
    context: Option<String>,
    category: String,
}

impl Task {
    /// Create a new task in the default category
    pub fn new(prompt: impl Into<String>) -> Result<Self, DomainError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(DomainError::InvalidTask(
                "prompt cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            prompt,
            context: None,
            category: DEFAULT_CATEGORY.to_string(),
        })
    }

    /// Attach a context blob. Blank context is treated as absent.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.trim().is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }

    /// Set the category label (normalized to lowercase)
    pub fn with_category(mut self, category: impl AsRef<str>) -> Self {
        self.category = normalize_category(category.as_ref());
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prompt)
    }
}

/// Normalize a category label: trimmed, lowercase, `general` when blank.
pub fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("Which queue should we use?").unwrap();
        assert_eq!(task.prompt(), "Which queue should we use?");
        assert_eq!(task.category(), "general");
        assert!(task.context().is_none());
    }

    #[test]
    fn test_empty_prompt_rejected() {
        assert!(Task::new("").is_err());
        assert!(Task::new("   ").is_err());
    }

    #[test]
    fn test_category_is_normalized() {
        let task = Task::new("q").unwrap().with_category("  Security ");
        assert_eq!(task.category(), "security");

        let task = Task::new("q").unwrap().with_category("");
        assert_eq!(task.category(), "general");
    }

    #[test]
    fn test_blank_context_is_absent() {
        let task = Task::new("q").unwrap().with_context("  \n");
        assert!(task.context().is_none());

        let task = Task::new("q").unwrap().with_context("fn main() {}");
        assert_eq!(task.context(), Some("fn main() {}"));
    }
}
