//! Error types for highlighting engine operations.

/// Result type for highlighting engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while configuring or running an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  #[error("Language '{0}' is not supported by this engine")]
  UnsupportedLanguage(String),
  #[error("Theme '{0}' is not available")]
  ThemeNotFound(String),
  #[error("Unknown engine feature '{0}'")]
  UnknownFeature(String),
  #[error("Invalid arguments for engine feature '{feature}': {reason}")]
  InvalidArguments {
    feature: String,
    reason:  String,
  },
  #[error("No source set before parsing")]
  MissingSource,
  #[error("Highlighting failed: {0}")]
  HighlightingFailed(String),
  #[error("No highlighting backend available. Enable the 'syntect' feature.")]
  NoBackendAvailable,
}
