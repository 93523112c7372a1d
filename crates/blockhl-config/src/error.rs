use std::io;

use blockhl_engine::EngineError;
use thiserror::Error;

/// Error type for blockhl-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Invalid configuration key: '{0}'")]
  UnknownKey(String),

  #[error("Invalid value for '{key}': {reason}")]
  InvalidValue { key: String, reason: String },

  #[error("Template error: {0}")]
  Template(String),

  #[error("Engine feature error: {0}")]
  Feature(#[from] EngineError),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),
}
