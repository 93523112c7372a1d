//! Shared helpers for integration tests.
#![allow(
  dead_code,
  clippy::panic,
  reason = "Not every test binary uses every helper"
)]

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use blockhl::{
  EngineError,
  EngineFactory,
  EngineFeature,
  HeaderType,
  HighlightEngine,
  HighlighterConfig,
  LineNumbers,
};

/// Engine producing GeSHi-shaped markup without any real tokenizing.
///
/// Every line becomes `<span class="tok">LINE</span>` with the line escaped,
/// wrapped according to the header type and numbering settings.
#[derive(Debug, Default)]
pub struct FakeEngine {
  source:       Option<String>,
  language:     String,
  header:       HeaderType,
  line_numbers: LineNumbers,
}

impl HighlightEngine for FakeEngine {
  fn name(&self) -> &'static str {
    "fake"
  }

  fn set_source(&mut self, source: &str) {
    self.source = Some(source.to_string());
  }

  fn set_language(&mut self, language: &str) -> Result<(), EngineError> {
    self.language = language.to_string();
    Ok(())
  }

  fn enable_line_numbers(&mut self, mode: LineNumbers, _step: usize) {
    self.line_numbers = mode;
  }

  fn parse_code(&mut self) -> Result<String, EngineError> {
    let source = self.source.as_deref().ok_or(EngineError::MissingSource)?;
    let lines: Vec<String> = source
      .lines()
      .map(|line| {
        format!(
          "<span class=\"tok\">{}</span>",
          html_escape::encode_text(line)
        )
      })
      .collect();

    let lang = &self.language;
    if self.line_numbers.is_enabled() {
      let items = lines
        .iter()
        .map(|line| {
          format!("<li class=\"li1\"><div class=\"de1\">{line}</div></li>")
        })
        .collect::<Vec<_>>()
        .join("\n");
      return Ok(match self.header {
        HeaderType::None => format!("<ol class=\"{lang}\">{items}</ol>"),
        _ => format!("<pre class=\"{lang}\"><ol>{items}</ol></pre>"),
      });
    }

    let body = lines.join("\n");
    Ok(match self.header {
      HeaderType::None => body,
      _ => format!("<pre class=\"{lang}\">{body}</pre>"),
    })
  }

  fn stylesheet(&self) -> Result<String, EngineError> {
    Ok(".tok { color: red; }".to_string())
  }

  fn apply_feature(&mut self, feature: &EngineFeature) -> Result<(), EngineError> {
    match feature {
      EngineFeature::SetHeaderType(header) => self.header = *header,
      EngineFeature::EnableLineNumbers(mode, step) => {
        self.enable_line_numbers(*mode, *step);
      },
      _ => {},
    }
    Ok(())
  }

  fn supports_language(&self, _language: &str) -> bool {
    true
  }
}

/// Factory handing out [`FakeEngine`]s and counting how many were built.
#[derive(Debug, Clone, Default)]
pub struct FakeFactory {
  pub created: Arc<AtomicUsize>,
}

impl FakeFactory {
  pub fn count(&self) -> usize {
    self.created.load(Ordering::SeqCst)
  }
}

impl EngineFactory for FakeFactory {
  fn create(&self) -> Box<dyn HighlightEngine> {
    self.created.fetch_add(1, Ordering::SeqCst);
    Box::new(FakeEngine::default())
  }
}

/// Default configuration with GeSHi-like list output and no toggle.
pub fn test_config() -> HighlighterConfig {
  let mut config = HighlighterConfig::default();
  config.show_plain_text_button = false;
  config
    .apply_overrides(&[
      "features.set_header_type=GESHI_HEADER_NONE".to_string(),
      "features.enable_line_numbers=GESHI_FANCY_LINE_NUMBERS,2".to_string(),
    ])
    .unwrap_or_else(|e| panic!("test overrides are valid: {e}"));
  config
}
