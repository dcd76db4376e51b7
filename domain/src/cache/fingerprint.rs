//! Task fingerprints and cache keys

use crate::core::task::Task;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stable SHA-256 over (task text, category, hash of context)
///
/// # Example
///
/// ```
/// use consilium_domain::cache::Fingerprint;
/// use consilium_domain::core::task::Task;
///
/// let a = Task::new("Queue or cron?").unwrap().with_category("Ops");
/// let b = Task::new("Queue or cron?").unwrap().with_category("ops");
/// assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(task: &Task) -> Self {
        let context_hash = Sha256::digest(task.context().unwrap_or_default().as_bytes());

        let mut hasher = Sha256::new();
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart
        for part in [task.prompt().as_bytes(), task.category().as_bytes()] {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        hasher.update(context_hash);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for logs
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cache key for one agent's answer to one task
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub fingerprint: Fingerprint,
    pub agent: String,
}

impl CacheKey {
    pub fn new(fingerprint: Fingerprint, agent: impl Into<String>) -> Self {
        Self {
            fingerprint,
            agent: agent.into(),
        }
    }

    /// Hex digest of the whole key; safe to use as a file name
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.fingerprint.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.agent.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.fingerprint.short(), self.agent)
    }
}
