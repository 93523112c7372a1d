//! # blockhl - Highlight code blocks embedded in HTML
//!
//! Finds container elements such as `<pre lang="php">` in an HTML string,
//! decodes their content, runs it through a highlighting engine and splices
//! the highlighted markup back into the page. Containers can be renamed, a
//! "Show Plain Text" toggle can be added in front of every block, and the
//! result can be wrapped in user supplied templates.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use blockhl::{Highlighter, HighlighterConfig};
//!
//! let highlighter = Highlighter::new(HighlighterConfig::default())?;
//! let html = highlighter.highlight(r#"<p>Hi</p><pre lang="php">echo 1;</pre>"#)?;
//! assert!(html.starts_with("<p>Hi</p><a href=\"#null\""));
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use blockhl::{Highlighter, HighlighterConfig};
//!
//! let mut config = HighlighterConfig::default();
//! config.show_plain_text_button = false;
//! config.default_language = Some("text".to_string());
//! config.apply_override("features.enable_line_numbers", "GESHI_NORMAL_LINE_NUMBERS")?;
//!
//! let highlighter = Highlighter::new(config)?;
//! let table = highlighter.highlight_as_table("a\nb\nc", "rust")?;
//! ```
//!
//! The engine is pluggable through [`EngineFactory`], see
//! [`Highlighter::with_engine_factory`].

pub mod error;
pub mod highlighter;
pub mod rewrite;
pub mod scanner;
pub mod table;

pub use blockhl_config::{
  ConfigLayer,
  ContainerMarkup,
  HighlighterConfig,
  Templates,
};
pub use blockhl_engine::{
  EngineError,
  EngineFactory,
  EngineFeature,
  FeatureArg,
  HeaderType,
  HighlightEngine,
  LineNumbers,
};

pub use crate::{
  error::{HighlightError, HighlightResult},
  highlighter::Highlighter,
  scanner::{BlockScanner, CodeBlock, Segment},
  table::convert_to_table,
};
