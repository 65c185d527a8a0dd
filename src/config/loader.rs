// src/config/loader.rs
//! TOML configuration loading with validation

use std::path::Path;

use super::{validate_config, PipelineConfig};

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileNotFound(String),
    ParseError(String),
    ValidationError(String),
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "configuration file not found: {}", path)
            }
            ConfigError::ParseError(msg) => write!(f, "configuration parse error: {}", msg),
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation error: {}", msg)
            }
            ConfigError::IoError(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Parse and validate a configuration from TOML text
pub fn load_from_str(text: &str) -> Result<PipelineConfig, ConfigError> {
    let cfg: PipelineConfig = toml::from_str(text)?;
    validate_config(&cfg).map_err(ConfigError::ValidationError)?;
    Ok(cfg)
}

/// Load and validate a configuration file
pub fn load_from_path(path: &Path) -> Result<PipelineConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    load_from_str(&text)
}
