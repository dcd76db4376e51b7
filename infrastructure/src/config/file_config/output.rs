//! Output and logging configuration from TOML (`[output]` and `[logging]` sections)

use consilium_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export OutputFormat from domain for convenience
pub use consilium_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Raw logging configuration from TOML
///
/// ```toml
/// [logging]
/// dir = "~/.local/state/consilium/logs"   # daily rolling diagnostic log
/// transcript = "consultations.jsonl"       # JSONL consultation transcript
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the diagnostic log file; no file log when unset
    pub dir: Option<PathBuf>,
    /// Path of the JSONL transcript; no transcript when unset
    pub transcript: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_deserialize() {
        let toml_str = r#"
[output]
format = "json"
color = false

[logging]
transcript = "out.jsonl"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert_eq!(config.logging.transcript, Some(PathBuf::from("out.jsonl")));
        assert!(config.logging.dir.is_none());
    }
}
