//! Response cache port
//!
//! The cache is an optimization only: every failure surfaces as
//! [`CacheError::Unavailable`] and callers carry on without it.

use async_trait::async_trait;
use consilium_domain::{AgentResponse, CacheKey};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// TTL cache of agent answers keyed by task fingerprint and agent
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fresh entry for `key`, if any. Expired entries read as absent and
    /// are left in place for [`sweep`](Self::sweep).
    async fn lookup(&self, key: &CacheKey) -> Result<Option<AgentResponse>, CacheError>;

    /// Insert or overwrite; the last writer wins.
    async fn store(&self, key: &CacheKey, response: &AgentResponse, ttl: Duration) -> Result<(), CacheError>;

    /// Evict expired entries, returning how many were removed.
    async fn sweep(&self) -> Result<usize, CacheError>;
}

/// Cache that never hits, used when caching is disabled
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn lookup(&self, _key: &CacheKey) -> Result<Option<AgentResponse>, CacheError> {
        Ok(None)
    }

    async fn store(&self, _key: &CacheKey, _response: &AgentResponse, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn sweep(&self) -> Result<usize, CacheError> {
        Ok(0)
    }
}
