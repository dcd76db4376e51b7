//! Configuration file loading for consilium
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONSILIUM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./consilium.toml` or `./.consilium.toml`
//! 4. Global: `$XDG_CONFIG_HOME/consilium/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    AdapterKind, CacheBackend, ConfigValidationError, FileAgentConfig, FileCacheConfig, FileConfig,
    FileConsultConfig, FileDebateConfig, FileDispatchConfig, FileEscalationConfig, FileLoggingConfig,
    FileNormalizerConfig, FileOutputConfig, FileOutputFormat, FileRouteConfig, FileRoutingConfig,
};
pub use loader::ConfigLoader;
