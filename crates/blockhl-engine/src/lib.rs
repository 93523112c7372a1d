//! Highlighting engine abstraction for blockhl.
//!
//! The [`HighlightEngine`] trait models the engine as a small stateful object
//! (`set_source`, `set_language`, `parse_code`, ...) so that alternative
//! backends can be plugged in. Engines are configured with typed
//! [`EngineFeature`] values parsed from configuration tables.
//!
//! Currently supported backends:
//! - **Syntect** - Sublime Text syntax definitions, with two-face added for
//!   extended syntax definitions and themes

pub mod error;
pub mod features;
pub mod markup;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use features::{EngineFeature, FeatureArg};
pub use types::{EngineFactory, HeaderType, HighlightEngine, LineNumbers};

#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use crate::syntect::SyntectEngine;

/// Create a boxed instance of the default engine.
///
/// # Errors
///
/// Returns [`EngineError::NoBackendAvailable`] when the crate was built
/// without any backend feature.
pub fn create_default_engine() -> EngineResult<Box<dyn HighlightEngine>> {
  #[cfg(feature = "syntect")]
  {
    Ok(Box::new(SyntectEngine::new()))
  }

  #[cfg(not(feature = "syntect"))]
  {
    Err(EngineError::NoBackendAvailable)
  }
}

/// Create a factory producing fresh instances of the default engine.
///
/// # Errors
///
/// Returns [`EngineError::NoBackendAvailable`] when the crate was built
/// without any backend feature.
pub fn default_engine_factory() -> EngineResult<Box<dyn EngineFactory>> {
  #[cfg(feature = "syntect")]
  {
    Ok(Box::new(|| {
      Box::new(SyntectEngine::new()) as Box<dyn HighlightEngine>
    }))
  }

  #[cfg(not(feature = "syntect"))]
  {
    Err(EngineError::NoBackendAvailable)
  }
}
