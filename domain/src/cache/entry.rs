//! Persisted cache entry

use crate::response::AgentResponse;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One cached answer: `{response, created_at, ttl}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub response: AgentResponse,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
    /// Time to live in milliseconds
    pub ttl: u64,
}

impl CacheEntry {
    pub fn new(response: AgentResponse, created_at: u64, ttl: Duration) -> Self {
        Self {
            response,
            created_at,
            ttl: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Fresh iff `now - created_at < ttl`. Entries from the future count as fresh.
    pub fn is_fresh(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) < self.ttl
    }

    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::test_support::answer;

    #[test]
    fn test_freshness_boundary() {
        let entry = CacheEntry::new(answer("a", "x", 7), 1_000, Duration::from_millis(500));
        assert!(entry.is_fresh(1_000));
        assert!(entry.is_fresh(1_499));
        assert!(!entry.is_fresh(1_500));
        assert!(!entry.is_fresh(10_000));
        assert_eq!(entry.expires_at(), 1_500);
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let entry = CacheEntry::new(answer("a", "x", 7), 1_000, Duration::ZERO);
        assert!(!entry.is_fresh(1_000));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = CacheEntry::new(answer("a", "x", 7), 42, Duration::from_secs(1));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["created_at"], 42);
        assert_eq!(value["ttl"], 1000);
        assert_eq!(value["response"]["consultant"], "a");
    }
}
