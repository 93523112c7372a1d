use blockhl_config::ConfigError;
use blockhl_engine::EngineError;
use thiserror::Error;

pub type HighlightResult<T> = Result<T, HighlightError>;

/// Errors raised while highlighting HTML.
#[derive(Debug, Error)]
pub enum HighlightError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("Template rendering failed: {0}")]
  Template(#[from] tera::Error),

  #[error("Invalid block pattern: {0}")]
  Pattern(#[from] regex::Error),
}
