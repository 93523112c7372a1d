//! The [`Highlighter`] facade.
//!
//! Configuration is validated and resolved once, when the highlighter is
//! built. Every call afterwards creates its own engine instance, so a single
//! highlighter can be shared freely between threads.

use std::fmt;

use blockhl_config::{HighlighterConfig, Templates};
use blockhl_engine::{
  EngineFactory,
  EngineFeature,
  HighlightEngine,
  LineNumbers,
  default_engine_factory,
};

use crate::{
  error::HighlightResult,
  rewrite::{BlockParts, BlockTemplates, ContainerMapper},
  scanner::{BlockScanner, CodeBlock, Segment},
  table::convert_to_table,
};

/// Finds code blocks in HTML and replaces them with highlighted markup.
pub struct Highlighter {
  config:     HighlighterConfig,
  features:   Vec<EngineFeature>,
  scanner:    BlockScanner,
  containers: ContainerMapper,
  templates:  BlockTemplates,
  engines:    Box<dyn EngineFactory>,
}

impl fmt::Debug for Highlighter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Highlighter")
      .field("config", &self.config)
      .field("features", &self.features)
      .finish_non_exhaustive()
  }
}

impl Highlighter {
  /// Create a highlighter backed by the default engine.
  ///
  /// # Errors
  ///
  /// Returns an error if the configuration is invalid, the engine feature
  /// file cannot be loaded, or no engine backend was compiled in.
  pub fn new(config: HighlighterConfig) -> HighlightResult<Self> {
    let engines = default_engine_factory()?;
    Self::with_engine_factory(config, engines)
  }

  /// Create a highlighter that builds its engines with `engines`.
  ///
  /// # Errors
  ///
  /// Returns an error if the configuration is invalid or the engine feature
  /// file cannot be loaded.
  pub fn with_engine_factory(
    config: HighlighterConfig,
    engines: Box<dyn EngineFactory>,
  ) -> HighlightResult<Self> {
    config.validate()?;
    let features = config.engine_features()?;
    log::debug!("Resolved {} engine feature(s)", features.len());

    let scanner =
      BlockScanner::new(&config.valid_containers, &config.lang_attribute)?;
    let containers = ContainerMapper::new(&config.container_map)?;
    let defaults = Templates::default();
    let templates =
      BlockTemplates::new(config.templates.as_ref().unwrap_or(&defaults))?;

    Ok(Self {
      config,
      features,
      scanner,
      containers,
      templates,
      engines,
    })
  }

  /// The configuration this highlighter was built with.
  #[must_use]
  pub const fn config(&self) -> &HighlighterConfig {
    &self.config
  }

  /// Engine features applied to every engine instance.
  #[must_use]
  pub fn features(&self) -> &[EngineFeature] {
    &self.features
  }

  /// Highlight every code block in `html`, leaving everything else untouched.
  ///
  /// # Errors
  ///
  /// Returns an error if the engine or a template fails for any block.
  pub fn highlight(&self, html: &str) -> HighlightResult<String> {
    let mut out = String::with_capacity(html.len());
    let mut blocks = 0_usize;
    for segment in self.scanner.segments(html) {
      match segment {
        Segment::Text(text) => out.push_str(text),
        Segment::Block(block) => {
          blocks += 1;
          out.push_str(&self.replace_block(&block)?);
        },
      }
    }
    log::debug!("Highlighted {blocks} code block(s)");
    Ok(out)
  }

  /// Highlight `text` as `language`.
  ///
  /// # Errors
  ///
  /// Returns an error if the engine fails.
  pub fn highlight_text(
    &self,
    text: &str,
    language: &str,
  ) -> HighlightResult<String> {
    let mut engine = self.engine()?;
    Ok(engine.highlight(text, language)?)
  }

  /// Highlight `text` as `language`, preceded by the engine stylesheet.
  ///
  /// # Errors
  ///
  /// Returns an error if the engine fails.
  pub fn highlight_text_with_stylesheet(
    &self,
    text: &str,
    language: &str,
  ) -> HighlightResult<String> {
    let mut engine = self.engine()?;
    engine.set_source(text);
    engine.set_language(language)?;
    let style = style_block(&engine.stylesheet()?);
    let code = engine.parse_code()?;
    Ok(style + &code)
  }

  /// Highlight `text` as `language` and lay it out as a table with a line
  /// number column.
  ///
  /// # Errors
  ///
  /// Returns an error if the engine fails.
  pub fn highlight_as_table(
    &self,
    text: &str,
    language: &str,
  ) -> HighlightResult<String> {
    let mut engine = self.engine()?;
    engine.set_source(text);
    engine.set_language(language)?;
    engine.enable_line_numbers(LineNumbers::Normal, 1);
    Ok(convert_to_table(&engine.parse_code()?))
  }

  /// Resolve a language hint.
  ///
  /// Returns the hint if it is a valid language, the default language if one
  /// is configured, and `None` otherwise.
  #[must_use]
  pub fn valid_lang<'a>(&'a self, lang: &'a str) -> Option<&'a str> {
    if self.config.is_valid_language(lang) {
      return Some(lang);
    }
    self.config.default_language.as_deref()
  }

  /// Stylesheet for the markup produced with the configured features.
  ///
  /// # Errors
  ///
  /// Returns an error if the engine cannot produce a stylesheet.
  pub fn stylesheet(&self) -> HighlightResult<String> {
    Ok(self.engine()?.stylesheet()?)
  }

  fn engine(&self) -> HighlightResult<Box<dyn HighlightEngine>> {
    let mut engine = self.engines.create();
    engine.configure(&self.features)?;
    log::trace!("Configured {} engine", engine.name());
    Ok(engine)
  }

  fn replace_block(&self, block: &CodeBlock<'_>) -> HighlightResult<String> {
    let language = self.valid_lang(block.language);
    let code = html_escape::decode_html_entities(block.content);
    let (open, close) = self.containers.map(block);

    let code = if let Some(language) = language {
      self.highlight_text(trim_code(&code), language)?
    } else {
      log::debug!(
        "Leaving <{}> block unhighlighted, no valid language for '{}'",
        block.tag,
        block.language
      );
      code.into_owned()
    };

    self.templates.render(&BlockParts {
      open:      &open,
      code:      &code,
      close:     &close,
      showplain: self.config.show_plain_text_button,
    })
  }
}

/// Wrap a stylesheet in an inline `<style>` element.
fn style_block(css: &str) -> String {
  format!("\n<style type=\"text/css\">\n<!--\n{css}\n-->\n</style>\n")
}

/// Strip surrounding whitespace and NUL bytes from code.
fn trim_code(code: &str) -> &str {
  code.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B'))
}
