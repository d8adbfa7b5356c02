//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV_VAR: &str = "RELAY_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: RelayConfig = toml::from_str(&content)?;

    finish(config)
}

/// Load from `path` when given, otherwise start from defaults.
///
/// Environment overrides are applied in both cases before validation.
pub fn load_or_default(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(RelayConfig::default()),
    }
}

fn finish(mut config: RelayConfig) -> Result<RelayConfig, ConfigError> {
    if let Ok(base_url) = std::env::var(BASE_URL_ENV_VAR) {
        if !base_url.trim().is_empty() {
            config.api.base_url = base_url.trim().to_string();
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
