use async_trait::async_trait;
use consilium_application::{CacheError, ResponseCache};
use consilium_domain::{AgentResponse, CacheEntry, CacheKey, Clock, SystemClock};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const ENTRY_EXTENSION: &str = "json";

/// Cache persisted as one `{response, created_at, ttl}` JSON file per key,
/// named by the key digest.
///
/// Writes go to a temporary file that is renamed into place, so readers
/// never see a half-written entry and the last writer wins.
pub struct FileResponseCache {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    write_seq: AtomicU64,
}

impl FileResponseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(dir, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key.digest(), ENTRY_EXTENSION))
    }

    fn temp_path(&self, key: &CacheKey) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.{}.tmp", key.digest(), std::process::id(), seq))
    }

    async fn read_entry(path: &Path) -> Result<Option<CacheEntry>, CacheError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable("read", path, e)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                debug!("Ignoring unreadable cache entry {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

fn unavailable(action: &str, path: &Path, e: impl std::fmt::Display) -> CacheError {
    CacheError::Unavailable(format!("{} {}: {}", action, path.display(), e))
}

#[async_trait]
impl ResponseCache for FileResponseCache {
    async fn lookup(&self, key: &CacheKey) -> Result<Option<AgentResponse>, CacheError> {
        let now = self.clock.now_millis();
        let entry = Self::read_entry(&self.entry_path(key)).await?;
        Ok(entry.filter(|e| e.is_fresh(now)).map(|e| e.response))
    }

    async fn store(&self, key: &CacheKey, response: &AgentResponse, ttl: Duration) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| unavailable("create", &self.dir, e))?;

        let entry = CacheEntry::new(response.clone(), self.clock.now_millis(), ttl);
        let json = serde_json::to_vec_pretty(&entry)
            .map_err(|e| CacheError::Unavailable(format!("serialize entry for {}: {}", key, e)))?;

        let temp = self.temp_path(key);
        let path = self.entry_path(key);
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| unavailable("write", &temp, e))?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(unavailable("rename", &path, e));
        }
        debug!("Cached {} at {}", key, path.display());
        Ok(())
    }

    async fn sweep(&self) -> Result<usize, CacheError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(unavailable("list", &self.dir, e)),
        };

        let now = self.clock.now_millis();
        let mut evicted = 0;
        while let Some(dir_entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable("list", &self.dir, e))?
        {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            // Unreadable entries can never hit, so they go too
            let keep = matches!(Self::read_entry(&path).await, Ok(Some(entry)) if entry.is_fresh(now));
            if keep {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => evicted += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Could not evict {}: {}", path.display(), e),
            }
        }

        debug!("Swept {} expired cache entries from {}", evicted, self.dir.display());
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
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = FileResponseCache::with_clock(dir.path(), clock.clone());
        let k = key("Which queue?", "claude");

        assert!(cache.lookup(&k).await.unwrap().is_none());
        cache.store(&k, &response("claude", "kafka"), Duration::from_secs(10)).await.unwrap();

        let hit = cache.lookup(&k).await.unwrap().unwrap();
        assert_eq!(hit.approach(), "kafka");

        clock.advance(10_000);
        assert!(cache.lookup(&k).await.unwrap().is_none());
        assert_eq!(cache.sweep().await.unwrap(), 1);
        assert_eq!(cache.sweep().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entries_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(0));
        let k = key("q", "a");

        FileResponseCache::with_clock(dir.path(), clock.clone())
            .store(&k, &response("a", "x"), Duration::from_secs(60))
            .await
            .unwrap();

        let reopened = FileResponseCache::with_clock(dir.path(), clock);
        assert!(reopened.lookup(&k).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_persisted_shape() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResponseCache::with_clock(dir.path(), Arc::new(ManualClock::new(42)));
        let k = key("q", "a");
        cache.store(&k, &response("a", "x"), Duration::from_secs(2)).await.unwrap();

        let path = dir.path().join(format!("{}.json", k.digest()));
        let value: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(value["created_at"], 42);
        assert_eq!(value["ttl"], 2_000);
        assert_eq!(value["response"]["consultant"], "a");

        // No temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_miss_and_is_swept() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResponseCache::with_clock(dir.path(), Arc::new(ManualClock::new(0)));
        let k = key("q", "a");
        std::fs::write(dir.path().join(format!("{}.json", k.digest())), b"{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"left alone").unwrap();

        assert!(cache.lookup(&k).await.unwrap().is_none());
        assert_eq!(cache.sweep().await.unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileResponseCache::new(dir.path().join("not-yet"));

        assert_eq!(cache.sweep().await.unwrap(), 0);
        assert!(cache.lookup(&key("q", "a")).await.unwrap().is_none());
        // Created on first store
        cache.store(&key("q", "a"), &response("a", "x"), Duration::from_secs(60)).await.unwrap();
        assert!(cache.dir().exists());
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        // A regular file where the cache directory should be
        let cache = FileResponseCache::new(&blocker);

        let err = cache
            .store(&key("q", "a"), &response("a", "x"), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Unavailable(_)));
    }
}
