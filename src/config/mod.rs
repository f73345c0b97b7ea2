//! Engine configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object is a
//! valid configuration.
//!
//! ```json
//! { "log_level": "info", "log_mutations": false, "metrics_enabled": true }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Logger, Severity};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum severity written by the logger
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    /// Log every applied mutation at trace level
    #[serde(default)]
    pub log_mutations: bool,

    /// Maintain operational counters
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> Severity {
    Severity::Info
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_mutations: false,
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&content)?;
        crate::observability::log_event(
            &config.logger(),
            crate::observability::Event::ConfigLoaded,
            &[("path", path.display().to_string().as_str())],
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        // Mutation logs are trace lines; a higher threshold would swallow them all
        if self.log_mutations && self.log_level > Severity::Trace {
            return Err(ConfigError::Invalid(format!(
                "log_mutations requires log_level 'trace', got '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Quiet configuration: only fatal lines, no counters
    pub fn quiet() -> Self {
        Self {
            log_level: Severity::Fatal,
            log_mutations: false,
            metrics_enabled: false,
        }
    }

    pub fn logger(&self) -> Logger {
        Logger::new(self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.log_level, Severity::Info);
        assert!(config.metrics_enabled);
        assert!(!config.log_mutations);
    }

    #[test]
    fn test_mutation_logging_needs_trace() {
        let err = EngineConfig::from_json(r#"{"log_mutations": true}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config =
            EngineConfig::from_json(r#"{"log_mutations": true, "log_level": "trace"}"#).unwrap();
        assert!(config.log_mutations);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = EngineConfig::from_json(r#"{"log_level": "chatty"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"log_level": "fatal", "metrics_enabled": false}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.log_level, Severity::Fatal);
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = EngineConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
