//! Configuration loader and validator for the report dispatcher.
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub backend: Backend,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub roster_path: String,
}

/// Delivery backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backend {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.roster_path.trim().is_empty() {
        return Err(ConfigError::Invalid("app.roster_path must be non-empty"));
    }

    if cfg.backend.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("backend.base_url must be non-empty"));
    }
    if Url::parse(&cfg.backend.base_url).is_err() {
        return Err(ConfigError::Invalid("backend.base_url must be a valid URL"));
    }
    if cfg.backend.request_timeout_ms == 0 {
        return Err(ConfigError::Invalid(
            "backend.request_timeout_ms must be > 0",
        ));
    }

    Ok(())
}

/// Example YAML configuration, used by the `print-config` subcommand and the tests.
pub fn example() -> &'static str {
    r#"app:
  roster_path: "./data/students.json"

backend:
  base_url: "http://localhost:5000"
  request_timeout_ms: 10000
"#
}
