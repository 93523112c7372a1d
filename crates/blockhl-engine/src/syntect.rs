//! Syntect-based highlighting engine enhanced with two-face.
//!
//! Uses Sublime Text syntax definitions (TextMate grammars) and themes, with
//! two-face providing the grammars and themes syntect does not bundle. Output
//! follows the list layout from [`crate::markup`], one item per source line.

use std::sync::OnceLock;

use syntect::{
  easy::HighlightLines,
  highlighting::{Style, Theme, ThemeSet},
  html::{
    ClassStyle,
    ClassedHTMLGenerator,
    IncludeBackground,
    css_for_theme_with_class_style,
    styled_line_to_highlighted_html,
  },
  parsing::{SyntaxReference, SyntaxSet},
  util::LinesWithEndings,
};
use two_face::theme::{EmbeddedLazyThemeSet, EmbeddedThemeName};

use crate::{
  error::{EngineError, EngineResult},
  features::EngineFeature,
  markup::{self, Layout},
  types::{HeaderType, HighlightEngine, LineNumbers},
};

/// Prefix for scope classes when classes are enabled.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

const DEFAULT_THEME: &str = "InspiredGitHub";
const DEFAULT_TAB_WIDTH: usize = 8;
const DEFAULT_FANCY_STEP: usize = 5;

/// Syntect-based highlighting engine
#[derive(Debug, Clone)]
pub struct SyntectEngine {
  source:        Option<String>,
  language:      Option<String>,
  header:        HeaderType,
  line_numbers:  LineNumbers,
  fancy_step:    usize,
  start_line:    usize,
  use_classes:   bool,
  tab_width:     usize,
  overall_class: Option<String>,
  overall_id:    Option<String>,
  theme_name:    String,
}

impl Default for SyntectEngine {
  fn default() -> Self {
    Self {
      source:        None,
      language:      None,
      header:        HeaderType::default(),
      line_numbers:  LineNumbers::default(),
      fancy_step:    DEFAULT_FANCY_STEP,
      start_line:    1,
      use_classes:   false,
      tab_width:     DEFAULT_TAB_WIDTH,
      overall_class: None,
      overall_id:    None,
      theme_name:    DEFAULT_THEME.to_string(),
    }
  }
}

impl SyntectEngine {
  /// Create a new engine with default settings.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Get the syntect `SyntaxSet`.
  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }

  /// Get the two-face theme set.
  fn theme_set() -> &'static EmbeddedLazyThemeSet {
    static THEME_SET: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(two_face::theme::extra)
  }

  /// Get the syntect default `ThemeSet`.
  fn default_theme_set() -> &'static ThemeSet {
    static DEFAULT_THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    DEFAULT_THEME_SET.get_or_init(ThemeSet::load_defaults)
  }

  /// Look up a theme by name, syntect's defaults first.
  fn find_theme(name: &str) -> Option<&'static Theme> {
    if let Some(theme) = Self::default_theme_set().themes.get(name) {
      return Some(theme);
    }
    embedded_theme(name).map(|embedded| Self::theme_set().get(embedded))
  }

  fn theme(&self) -> EngineResult<&'static Theme> {
    Self::find_theme(&self.theme_name)
      .ok_or_else(|| EngineError::ThemeNotFound(self.theme_name.clone()))
  }

  fn find_syntax(language: &str) -> &'static SyntaxReference {
    let syntax_set = Self::syntax_set();
    syntax_set.find_syntax_by_token(language).unwrap_or_else(|| {
      log::warn!("No grammar for language '{language}', using plain text");
      syntax_set.find_syntax_plain_text()
    })
  }

  /// Names of all themes this engine can use.
  #[must_use]
  pub fn available_themes() -> Vec<String> {
    let mut themes: Vec<String> =
      Self::default_theme_set().themes.keys().cloned().collect();
    themes.extend(EMBEDDED_THEMES.iter().map(|name| (*name).to_string()));
    themes.sort();
    themes.dedup();
    themes
  }

  fn classed_lines(
    source: &str,
    syntax: &SyntaxReference,
  ) -> EngineResult<Vec<String>> {
    let syntax_set = Self::syntax_set();
    let mut generator =
      ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
    for line in LinesWithEndings::from(source) {
      generator
        .parse_html_for_line_which_includes_newline(line)
        .map_err(|e| EngineError::HighlightingFailed(e.to_string()))?;
    }
    Ok(markup::split_balanced_lines(&generator.finalize()))
  }

  fn styled_lines(
    &self,
    source: &str,
    syntax: &SyntaxReference,
  ) -> EngineResult<Vec<String>> {
    let syntax_set = Self::syntax_set();
    let mut highlighter = HighlightLines::new(syntax, self.theme()?);
    let mut lines = Vec::new();

    for line in LinesWithEndings::from(source) {
      let ranges = highlighter
        .highlight_line(line, syntax_set)
        .map_err(|e| EngineError::HighlightingFailed(e.to_string()))?;
      let ranges: Vec<(Style, &str)> = ranges
        .into_iter()
        .map(|(style, text)| (style, text.trim_end_matches(['\n', '\r'])))
        .filter(|(_, text)| !text.is_empty())
        .collect();
      let html = styled_line_to_highlighted_html(&ranges, IncludeBackground::No)
        .map_err(|e| EngineError::HighlightingFailed(e.to_string()))?;
      lines.push(html);
    }

    Ok(lines)
  }
}

impl HighlightEngine for SyntectEngine {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn set_source(&mut self, source: &str) {
    self.source = Some(source.to_string());
  }

  fn set_language(&mut self, language: &str) -> EngineResult<()> {
    if language.trim().is_empty() {
      return Err(EngineError::UnsupportedLanguage(language.to_string()));
    }
    self.language = Some(language.to_lowercase());
    Ok(())
  }

  fn enable_line_numbers(&mut self, mode: LineNumbers, step: usize) {
    self.line_numbers = mode;
    self.fancy_step = step.max(1);
  }

  fn parse_code(&mut self) -> EngineResult<String> {
    let source = self.source.as_deref().ok_or(EngineError::MissingSource)?;
    let language = self.language.as_deref().unwrap_or("text");
    let syntax = Self::find_syntax(language);
    log::trace!(
      "Highlighting {} bytes as '{}' ({})",
      source.len(),
      language,
      syntax.name
    );

    let source = markup::expand_tabs(source, self.tab_width);
    let mut lines = if self.use_classes {
      Self::classed_lines(&source, syntax)?
    } else {
      self.styled_lines(&source, syntax)?
    };
    lines.truncate(source.lines().count().max(1));
    if lines.is_empty() {
      lines.push(String::new());
    }

    let layout = Layout {
      header:       self.header,
      line_numbers: self.line_numbers,
      fancy_step:   self.fancy_step,
      start_line:   self.start_line,
      class:        self.overall_class.as_deref().unwrap_or(language),
      id:           self.overall_id.as_deref(),
    };
    Ok(markup::render(&lines, &layout))
  }

  fn stylesheet(&self) -> EngineResult<String> {
    if !self.use_classes {
      return Ok(markup::LIST_CSS.to_string());
    }
    let css = css_for_theme_with_class_style(self.theme()?, CLASS_STYLE)
      .map_err(|e| EngineError::HighlightingFailed(e.to_string()))?;
    Ok(format!("{css}\n{}", markup::LIST_CSS))
  }

  fn apply_feature(&mut self, feature: &EngineFeature) -> EngineResult<()> {
    match feature {
      EngineFeature::SetHeaderType(header) => self.header = *header,
      EngineFeature::EnableLineNumbers(mode, step) => {
        self.enable_line_numbers(*mode, *step);
      },
      EngineFeature::StartLineNumbersAt(line) => self.start_line = *line,
      EngineFeature::EnableClasses(flag) => self.use_classes = *flag,
      EngineFeature::SetTabWidth(width) => self.tab_width = *width,
      EngineFeature::SetOverallClass(class) => {
        self.overall_class = Some(class.clone());
      },
      EngineFeature::SetOverallId(id) => self.overall_id = Some(id.clone()),
      EngineFeature::SetTheme(name) => {
        if Self::find_theme(name).is_none() {
          return Err(EngineError::ThemeNotFound(name.clone()));
        }
        self.theme_name.clone_from(name);
      },
    }
    Ok(())
  }

  fn supports_language(&self, language: &str) -> bool {
    Self::syntax_set().find_syntax_by_token(language).is_some()
  }
}

/// Themes provided by two-face on top of syntect's defaults.
const EMBEDDED_THEMES: &[&str] = &[
  "Ansi",
  "Base16",
  "Base16EightiesDark",
  "Base16MochaDark",
  "Base16OceanDark",
  "Base16OceanLight",
  "Base16_256",
  "ColdarkCold",
  "ColdarkDark",
  "DarkNeon",
  "Dracula",
  "Github",
  "GruvboxDark",
  "GruvboxLight",
  "InspiredGithub",
  "Leet",
  "MonokaiExtended",
  "MonokaiExtendedBright",
  "MonokaiExtendedLight",
  "MonokaiExtendedOrigin",
  "Nord",
  "OneHalfDark",
  "OneHalfLight",
  "SolarizedDark",
  "SolarizedLight",
  "SublimeSnazzy",
  "TwoDark",
  "VisualStudioDarkPlus",
  "Zenburn",
];

fn embedded_theme(name: &str) -> Option<EmbeddedThemeName> {
  let theme = match name {
    "Ansi" => EmbeddedThemeName::Ansi,
    "Base16" => EmbeddedThemeName::Base16,
    "Base16EightiesDark" => EmbeddedThemeName::Base16EightiesDark,
    "Base16MochaDark" => EmbeddedThemeName::Base16MochaDark,
    "Base16OceanDark" => EmbeddedThemeName::Base16OceanDark,
    "Base16OceanLight" => EmbeddedThemeName::Base16OceanLight,
    "Base16_256" => EmbeddedThemeName::Base16_256,
    "ColdarkCold" => EmbeddedThemeName::ColdarkCold,
    "ColdarkDark" => EmbeddedThemeName::ColdarkDark,
    "DarkNeon" => EmbeddedThemeName::DarkNeon,
    "Dracula" => EmbeddedThemeName::Dracula,
    "Github" => EmbeddedThemeName::Github,
    "GruvboxDark" => EmbeddedThemeName::GruvboxDark,
    "GruvboxLight" => EmbeddedThemeName::GruvboxLight,
    "InspiredGithub" => EmbeddedThemeName::InspiredGithub,
    "Leet" => EmbeddedThemeName::Leet,
    "MonokaiExtended" => EmbeddedThemeName::MonokaiExtended,
    "MonokaiExtendedBright" => EmbeddedThemeName::MonokaiExtendedBright,
    "MonokaiExtendedLight" => EmbeddedThemeName::MonokaiExtendedLight,
    "MonokaiExtendedOrigin" => EmbeddedThemeName::MonokaiExtendedOrigin,
    "Nord" => EmbeddedThemeName::Nord,
    "OneHalfDark" => EmbeddedThemeName::OneHalfDark,
    "OneHalfLight" => EmbeddedThemeName::OneHalfLight,
    "SolarizedDark" => EmbeddedThemeName::SolarizedDark,
    "SolarizedLight" => EmbeddedThemeName::SolarizedLight,
    "SublimeSnazzy" => EmbeddedThemeName::SublimeSnazzy,
    "TwoDark" => EmbeddedThemeName::TwoDark,
    "VisualStudioDarkPlus" => EmbeddedThemeName::VisualStudioDarkPlus,
    "Zenburn" => EmbeddedThemeName::Zenburn,
    _ => return None,
  };
  Some(theme)
}
