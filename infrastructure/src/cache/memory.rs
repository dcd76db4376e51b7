use async_trait::async_trait;
use consilium_application::{CacheError, ResponseCache};
use consilium_domain::{AgentResponse, CacheEntry, CacheKey, Clock, SystemClock};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Process-local cache. Concurrent lookups and stores never block each
/// other across keys; the last store for a key wins.
pub struct InMemoryResponseCache {
    entries: DashMap<CacheKey, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl InMemoryResponseCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Entries held, fresh or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn lookup(&self, key: &CacheKey) -> Result<Option<AgentResponse>, CacheError> {
        let now = self.clock.now_millis();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.response.clone()))
    }

    async fn store(&self, key: &CacheKey, response: &AgentResponse, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry::new(response.clone(), self.clock.now_millis(), ttl);
        self.entries.insert(key.clone(), entry);
        Ok(())
    }

    async fn sweep(&self) -> Result<usize, CacheError> {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        let evicted = before.saturating_sub(self.entries.len());
        debug!("Swept {} expired cache entries", evicted);
        Ok(evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{key, response};
    use super::*;
    use consilium_domain::ManualClock;

    #[tokio::test]
    async fn test_ttl_round_trip() {
        let clock = Arc::new(ManualClock::new(10_000));
        let cache = InMemoryResponseCache::new(clock.clone());
        let k = key("Which queue?", "claude");

        cache.store(&k, &response("claude", "kafka"), Duration::from_secs(60)).await.unwrap();

        clock.advance(59_999);
        let hit = cache.lookup(&k).await.unwrap().unwrap();
        assert_eq!(hit.approach(), "kafka");

        clock.advance(1);
        assert!(cache.lookup(&k).await.unwrap().is_none());
        // Expired entries stay until swept
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.sweep().await.unwrap(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_keys_are_per_agent_and_task() {
        let cache = InMemoryResponseCache::new(Arc::new(ManualClock::new(0)));
        let ttl = Duration::from_secs(60);
        cache.store(&key("q1", "a"), &response("a", "x"), ttl).await.unwrap();

        assert!(cache.lookup(&key("q1", "a")).await.unwrap().is_some());
        assert!(cache.lookup(&key("q1", "b")).await.unwrap().is_none());
        assert!(cache.lookup(&key("q2", "a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let cache = InMemoryResponseCache::new(Arc::new(ManualClock::new(0)));
        let k = key("q", "a");
        let ttl = Duration::from_secs(60);

        cache.store(&k, &response("a", "first"), ttl).await.unwrap();
        cache.store(&k, &response("a", "second"), ttl).await.unwrap();

        assert_eq!(cache.lookup(&k).await.unwrap().unwrap().approach(), "second");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_stores() {
        let cache = Arc::new(InMemoryResponseCache::new(Arc::new(ManualClock::new(0))));
        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let agent = format!("agent-{}", i);
                cache
                    .store(&key("q", &agent), &response(&agent, "x"), Duration::from_secs(60))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.len(), 16);
    }

    #[tokio::test]
    async fn test_sweep_keeps_fresh_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = InMemoryResponseCache::new(clock.clone());
        cache.store(&key("q", "short"), &response("short", "x"), Duration::from_secs(1)).await.unwrap();
        cache.store(&key("q", "long"), &response("long", "x"), Duration::from_secs(100)).await.unwrap();

        clock.advance(5_000);
        assert_eq!(cache.sweep().await.unwrap(), 1);
        assert!(cache.lookup(&key("q", "long")).await.unwrap().is_some());
    }
}
