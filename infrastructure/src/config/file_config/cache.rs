//! Response cache configuration from TOML (`[cache]` section)

use consilium_application::config::DEFAULT_CACHE_TTL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where cached answers live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process memory; gone when the process exits
    Memory,
    /// One JSON file per entry under `dir`
    #[default]
    File,
}

/// Raw cache configuration from TOML
///
/// ```toml
/// [cache]
/// ttl_seconds = 3600
/// backend = "file"
/// dir = "~/.cache/consilium"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub ttl_seconds: u64,
    pub backend: CacheBackend,
    /// Defaults to the platform cache directory
    pub dir: Option<PathBuf>,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL.as_secs(),
            backend: CacheBackend::default(),
            dir: None,
        }
    }
}

impl FileCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Configured directory, or `<cache dir>/consilium/responses`
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("consilium").join("responses")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_deserialize() {
        let toml_str = r#"
[cache]
ttl_seconds = 60
backend = "memory"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.backend, CacheBackend::Memory);
    }

    #[test]
    fn test_explicit_dir_wins() {
        let config = FileCacheConfig {
            dir: Some(PathBuf::from("/tmp/answers")),
            ..Default::default()
        };
        assert_eq!(config.resolved_dir(), Some(PathBuf::from("/tmp/answers")));
    }
}
