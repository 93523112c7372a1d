//! Core types and traits for highlighting engines.

use serde::{Deserialize, Serialize};

use crate::{error::EngineResult, features::EngineFeature};

/// Wrapper element emitted around the highlighted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderType {
  /// No wrapper at all.
  None,
  /// A `<div>` carrying the overall class.
  Div,
  /// A `<pre>` carrying the overall class.
  #[default]
  Pre,
  /// A `<div>` around numbered lines, a `<pre>` when numbering is off.
  PreValid,
}

impl HeaderType {
  /// Map a numeric header constant to a header type.
  #[must_use]
  pub const fn from_code(code: i64) -> Option<Self> {
    match code {
      0 => Some(Self::None),
      1 => Some(Self::Div),
      2 => Some(Self::Pre),
      3 => Some(Self::PreValid),
      _ => None,
    }
  }
}

/// Line numbering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineNumbers {
  #[default]
  None,
  /// Every line is rendered as an `li1` item.
  Normal,
  /// Every `step`-th line is rendered as an `li2` item.
  Fancy,
}

impl LineNumbers {
  /// Map a numeric line number constant to a mode.
  #[must_use]
  pub const fn from_code(code: i64) -> Option<Self> {
    match code {
      0 => Some(Self::None),
      1 => Some(Self::Normal),
      2 => Some(Self::Fancy),
      _ => None,
    }
  }

  #[must_use]
  pub const fn is_enabled(self) -> bool {
    !matches!(self, Self::None)
  }
}

/// Trait for highlighting engines.
///
/// An engine is a small state machine: the caller sets the source and the
/// language, optionally toggles features, and then asks for the markup with
/// [`HighlightEngine::parse_code`]. Instances are cheap to build and are not
/// meant to be shared between concurrent renders.
pub trait HighlightEngine: Send {
  /// Get the name of this engine
  fn name(&self) -> &'static str;

  /// Set the text to highlight.
  fn set_source(&mut self, source: &str);

  /// Set the language to highlight the source as.
  ///
  /// # Errors
  ///
  /// Engines may reject languages they cannot handle.
  fn set_language(&mut self, language: &str) -> EngineResult<()>;

  /// Enable or disable line numbering. `step` only matters for
  /// [`LineNumbers::Fancy`].
  fn enable_line_numbers(&mut self, mode: LineNumbers, step: usize);

  /// Highlight the current source as the current language.
  ///
  /// # Errors
  ///
  /// Returns an error if no source was set or the backend fails.
  fn parse_code(&mut self) -> EngineResult<String>;

  /// CSS matching the markup produced by [`HighlightEngine::parse_code`].
  ///
  /// Token colours are only part of it when the engine emits classes; inline
  /// styled output carries its own colours.
  ///
  /// # Errors
  ///
  /// Returns an error if the configured theme cannot be turned into CSS.
  fn stylesheet(&self) -> EngineResult<String>;

  /// Apply a single configuration feature.
  ///
  /// # Errors
  ///
  /// Returns an error if the feature value is not usable by this engine.
  fn apply_feature(&mut self, feature: &EngineFeature) -> EngineResult<()>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool;

  /// Apply features in order, stopping at the first failure.
  ///
  /// # Errors
  ///
  /// Returns the first error reported by [`HighlightEngine::apply_feature`].
  fn configure(&mut self, features: &[EngineFeature]) -> EngineResult<()> {
    for feature in features {
      self.apply_feature(feature)?;
    }
    Ok(())
  }

  /// Highlight `source` as `language` in one go.
  ///
  /// # Errors
  ///
  /// Propagates errors from [`HighlightEngine::set_language`] and
  /// [`HighlightEngine::parse_code`].
  fn highlight(&mut self, source: &str, language: &str) -> EngineResult<String> {
    self.set_source(source);
    self.set_language(language)?;
    self.parse_code()
  }
}

/// Builds fresh engine instances, one per render.
pub trait EngineFactory: Send + Sync {
  /// Create a new, unconfigured engine.
  fn create(&self) -> Box<dyn HighlightEngine>;
}

impl<F> EngineFactory for F
where
  F: Fn() -> Box<dyn HighlightEngine> + Send + Sync,
{
  fn create(&self) -> Box<dyn HighlightEngine> {
    self()
  }
}
