//! Configuration file handling
//!
//! `strictjson.json` is optional. Every key has a default; unknown keys are
//! rejected.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use super::errors::{CliError, CliResult};
use crate::decode::{StrictDecoder, DEFAULT_MAX_DOCUMENT_BYTES};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of schema definition files (default "./schemas")
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Largest document accepted, in bytes (default 16 MiB)
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Log filter used when `RUST_LOG` is unset (default "warn")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("./schemas")
}
fn default_max_document_bytes() -> usize {
    DEFAULT_MAX_DOCUMENT_BYTES
}
fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            max_document_bytes: default_max_document_bytes(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.max_document_bytes == 0 {
            return Err(CliError::config_error("max_document_bytes must be > 0"));
        }

        if self.schema_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("schema_dir must not be empty"));
        }

        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            CliError::config_error(format!(
                "Invalid log_filter '{}': {}",
                self.log_filter, e
            ))
        })?;

        Ok(())
    }

    pub fn decoder(&self) -> StrictDecoder {
        StrictDecoder::new().with_max_document_bytes(self.max_document_bytes)
    }

    /// `RUST_LOG` wins over `log_filter`.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("strictjson.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"schema_dir": "/etc/strictjson"}"#);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("/etc/strictjson"));
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"schema_dir": "s", "schema_dirs": "t"}"#);

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code_str(), "STRICT_CLI_CONFIG_ERROR");
        assert!(err.message().contains("schema_dirs"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"max_document_bytes": 0}"#);

        let err = Config::load(&path).unwrap_err();
        assert!(err.message().contains("max_document_bytes"));
    }

    #[test]
    fn test_bad_log_filter_rejected() {
        let config = Config {
            log_filter: "strictjson=loud".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code_str(), "STRICT_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.decoder().max_document_bytes(), DEFAULT_MAX_DOCUMENT_BYTES);
    }
}
