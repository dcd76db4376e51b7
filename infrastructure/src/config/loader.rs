//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in order
const PROJECT_FILES: [&str; 2] = ["consilium.toml", ".consilium.toml"];

/// Prefix for environment overrides (`CONSILIUM_CONSULT__DEBATE_ROUNDS=3`)
const ENV_PREFIX: &str = "CONSILIUM_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables `CONSILIUM_*` (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./consilium.toml` or `./.consilium.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/consilium/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(Self::global_config_path(), Self::project_config_path(), config_path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File layers only, lowest priority first
    fn figment(global: Option<PathBuf>, project: Option<PathBuf>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = project {
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/consilium/config.toml` if set,
    /// otherwise the platform config directory equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("consilium").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for --show-config)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] Environment: {}*", ENV_PREFIX));

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("  [{:<5}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./consilium.toml or ./.consilium.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.agents.is_empty());
        assert!(config.consult.enable_cache);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("consilium/config.toml"));
    }

    #[test]
    fn test_layers_merge_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        let explicit = dir.path().join("explicit.toml");

        fs::write(
            &global,
            "[consult]\ndebate_rounds = 4\nstrategy = \"risk_averse\"\n\n[cache]\nttl_seconds = 10\n",
        )
        .unwrap();
        fs::write(&project, "[consult]\ndebate_rounds = 5\n").unwrap();
        fs::write(&explicit, "[cache]\nttl_seconds = 99\n").unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(global), Some(project), Some(&explicit))
            .extract()
            .unwrap();

        // Project beats global, global beats defaults
        assert_eq!(config.consult.debate_rounds, 5);
        assert_eq!(config.consult.strategy, "risk_averse");
        // Explicit beats everything below it
        assert_eq!(config.cache.ttl_seconds, 99);
        // Untouched sections keep defaults
        assert!(config.output.color);
    }

    #[test]
    fn test_missing_global_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let config: FileConfig = ConfigLoader::figment(Some(missing), None, None).extract().unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_agents_array_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consilium.toml");
        fs::write(
            &path,
            "[[agents]]\nname = \"a\"\ncommand = \"echo\"\n\n[[agents]]\nname = \"b\"\ncommand = \"cat\"\n",
        )
        .unwrap();

        let config: FileConfig = ConfigLoader::figment(None, None, Some(&path)).extract().unwrap();
        assert_eq!(config.agents.len(), 2);
        assert!(config.to_council_config().is_ok());
    }
}
