use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use blockhl_engine::{EngineFeature, FeatureArg};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{error::ConfigError, templates::Templates};

/// File read from `config_path` when no features are configured inline.
pub const ENGINE_CONFIG_FILE: &str = "highlight.toml";

/// Directory searched for [`ENGINE_CONFIG_FILE`] when `config_path` is unset.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Languages highlighted out of the box.
pub const DEFAULT_LANGUAGES: &[&str] = &[
  "css",
  "html",
  "php",
  "javascript",
  "python",
  "sql",
  "ruby",
  "coffeescript",
  "bash",
  "rust",
  "go",
  "c",
  "yaml",
  "sass",
  "lua",
  "dart",
  "xml",
  "json",
];

/// Replacement markup for a container tag name.
///
/// `open` replaces the tag name inside the opening tag (attributes are kept),
/// `close` replaces it inside the closing tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerMarkup {
  pub open:  String,
  pub close: String,
}

impl ContainerMarkup {
  #[must_use]
  pub fn new(open: &str, close: &str) -> Self {
    Self {
      open:  open.to_string(),
      close: close.to_string(),
    }
  }
}

/// Configuration for highlighting code blocks embedded in HTML.
///
/// Fields are typically loaded from a TOML or JSON file, but can also be
/// built in code or adjusted with `KEY=VALUE` overrides. Unknown keys are
/// rejected in every case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlighterConfig {
  /// Directory containing the engine feature file. Only consulted when
  /// `features` is empty.
  pub config_path: Option<PathBuf>,

  /// Engine features, applied in order.
  pub features: IndexMap<String, Vec<FeatureArg>>,

  /// Elements that may contain highlightable code.
  pub valid_containers: Vec<String>,

  /// Replacement markup for container tags.
  pub container_map: HashMap<String, ContainerMarkup>,

  /// Languages that will be highlighted.
  pub valid_languages: Vec<String>,

  /// Language used when a block's hint is not a valid language. `"none"`,
  /// `"false"` and `""` all mean no fallback.
  #[serde(deserialize_with = "deserialize_language")]
  pub default_language: Option<String>,

  /// Regular expression matching the language attribute name.
  pub lang_attribute: String,

  /// Insert the plain text toggle before every block.
  pub show_plain_text_button: bool,

  /// Markup fragments used to assemble blocks.
  pub templates: Option<Templates>,
}

impl Default for HighlighterConfig {
  fn default() -> Self {
    Self {
      config_path:            None,
      features:               IndexMap::new(),
      valid_containers:       vec!["pre".to_string()],
      container_map:          HashMap::from([(
        "pre".to_string(),
        ContainerMarkup::new("div class=\"code\"", "div"),
      )]),
      valid_languages:        DEFAULT_LANGUAGES
        .iter()
        .map(|lang| (*lang).to_string())
        .collect(),
      default_language:       None,
      lang_attribute:         "(?:lang|class)".to_string(),
      show_plain_text_button: true,
      templates:              None,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EngineConfigFile {
  features: IndexMap<String, Vec<FeatureArg>>,
}

/// The keys set by a single configuration file.
///
/// Every field is optional so that a file only changes what it names. Lists
/// and maps replace the accumulated value as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
  pub config_path:            Option<PathBuf>,
  pub features:               Option<IndexMap<String, Vec<FeatureArg>>>,
  pub valid_containers:       Option<Vec<String>>,
  pub container_map:          Option<HashMap<String, ContainerMarkup>>,
  pub valid_languages:        Option<Vec<String>>,
  /// `Some(None)` clears an earlier fallback language.
  #[serde(default, deserialize_with = "deserialize_layer_language")]
  pub default_language:       Option<Option<String>>,
  pub lang_attribute:         Option<String>,
  pub show_plain_text_button: Option<bool>,
  pub templates:              Option<Templates>,
}

impl ConfigLayer {
  /// Read a layer from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    match path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase)
      .as_deref()
    {
      Some("json") => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      Some(_) => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }
}

impl HighlighterConfig {
  /// Load configuration from a file (TOML or JSON) on top of the defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let mut config = Self::default();
    config.merge(ConfigLayer::from_file(path)?);
    Ok(config)
  }

  /// Load configuration from files and overrides, merging them in order.
  ///
  /// When `config_files` is empty, a config file is looked up in the current
  /// directory; if none exists the defaults are used. The result is validated
  /// before it is returned.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is invalid, or
  /// validation fails.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();
    if config_files.is_empty() {
      if let Some(discovered) = Self::find_config_file() {
        log::info!("Using discovered config file: {}", discovered.display());
        config.merge(ConfigLayer::from_file(&discovered)?);
      }
    } else {
      for path in config_files {
        config.merge(ConfigLayer::from_file(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
    }

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Search for config files in the current directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    [
      "blockhl.toml",
      "blockhl.json",
      ".blockhl.toml",
      ".blockhl.json",
      ".config/blockhl.toml",
      ".config/blockhl.json",
    ]
    .iter()
    .map(|name| current_dir.join(name))
    .find(|path| path.is_file())
  }

  /// Apply the keys set by `layer`, leaving every other field untouched.
  pub fn merge(&mut self, layer: ConfigLayer) {
    if let Some(config_path) = layer.config_path {
      self.config_path = Some(config_path);
    }
    if let Some(features) = layer.features {
      self.features = features;
    }
    if let Some(valid_containers) = layer.valid_containers {
      self.valid_containers = valid_containers;
    }
    if let Some(container_map) = layer.container_map {
      self.container_map = container_map;
    }
    if let Some(valid_languages) = layer.valid_languages {
      self.valid_languages = valid_languages;
    }
    if let Some(default_language) = layer.default_language {
      self.default_language = default_language;
    }
    if let Some(lang_attribute) = layer.lang_attribute {
      self.lang_attribute = lang_attribute;
    }
    if let Some(show_plain_text_button) = layer.show_plain_text_button {
      self.show_plain_text_button = show_plain_text_button;
    }
    if let Some(templates) = layer.templates {
      self.templates = Some(templates);
    }
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "show_plain_text_button=false".to_string(),
  ///     "valid_languages=rust,php".to_string(),
  /// ])?;
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single configuration override by key.
  ///
  /// List values are comma separated. `container_map.TAG` takes `OPEN|CLOSE`
  /// (an empty value removes the mapping), `features.NAME` takes comma
  /// separated arguments and `templates.NAME` takes the fragment source.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::UnknownKey`] for keys that do not name a
  /// configuration field, or [`ConfigError::InvalidValue`] when the value
  /// cannot be used for the key.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let (field, entry) = match key.split_once('.') {
      Some((field, entry)) => (field, Some(entry)),
      None => (key, None),
    };

    match (field, entry) {
      ("config_path", None) => {
        self.config_path =
          (!value.is_empty()).then(|| PathBuf::from(value));
      },
      ("features", Some(name)) => {
        let args = parse_feature_args(value);
        EngineFeature::parse(name, &args)?;
        self.features.insert(name.to_string(), args);
      },
      ("valid_containers", None) => self.valid_containers = parse_list(value),
      ("container_map", Some(tag)) => {
        self.override_container(key, tag, value)?;
      },
      ("valid_languages", None) => self.valid_languages = parse_list(value),
      ("default_language", None) => {
        self.default_language = normalize_language(value);
      },
      ("lang_attribute", None) => self.lang_attribute = value.to_string(),
      ("show_plain_text_button", None) => {
        self.show_plain_text_button = parse_bool(key, value)?;
      },
      ("templates", Some(fragment)) => {
        self.override_template(key, fragment, value)?;
      },
      _ => return Err(ConfigError::UnknownKey(key.to_string())),
    }

    Ok(())
  }

  fn override_container(
    &mut self,
    key: &str,
    tag: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if value.is_empty() {
      self.container_map.remove(tag);
      return Ok(());
    }
    let (open, close) = value.split_once('|').ok_or_else(|| {
      ConfigError::InvalidValue {
        key:    key.to_string(),
        reason: format!("expected OPEN|CLOSE, got '{value}'"),
      }
    })?;
    self
      .container_map
      .insert(tag.to_string(), ContainerMarkup::new(open, close));
    Ok(())
  }

  fn override_template(
    &mut self,
    key: &str,
    fragment: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let templates = self.templates.get_or_insert_with(Templates::default);
    let slot = match fragment {
      "layout" => &mut templates.layout,
      "content" => &mut templates.content,
      "showplain" => &mut templates.showplain,
      _ => return Err(ConfigError::UnknownKey(key.to_string())),
    };
    *slot = value.to_string();
    Ok(())
  }

  /// Validate the configuration.
  ///
  /// All problems are collected and reported together.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Config`] listing every invalid field.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    for container in &self.valid_containers {
      if !is_tag_name(container) {
        errors.push(format!("Invalid container tag name: '{container}'"));
      }
    }

    for (tag, markup) in &self.container_map {
      if !is_tag_name(tag) {
        errors.push(format!("Invalid container map tag name: '{tag}'"));
      }
      if markup.open.trim().is_empty() || markup.close.trim().is_empty() {
        errors.push(format!(
          "Container map entry for '{tag}' needs both open and close markup"
        ));
      }
    }

    if self.lang_attribute.is_empty() {
      errors.push("Language attribute pattern must not be empty".to_string());
    } else if let Err(e) = Regex::new(&format!("(?:{})", self.lang_attribute)) {
      errors.push(format!(
        "Invalid language attribute pattern '{}': {e}",
        self.lang_attribute
      ));
    }

    if let Some(ref lang) = self.default_language
      && lang.trim().is_empty()
    {
      errors.push("Default language must not be empty".to_string());
    }

    if let Some(ref templates) = self.templates
      && let Err(e) = templates.validate()
    {
      errors.push(e.to_string());
    }

    if let Err(e) = EngineFeature::parse_all(&self.features) {
      errors.push(e.to_string());
    }

    if !errors.is_empty() {
      return Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{}",
        errors.join("\n")
      )));
    }

    Ok(())
  }

  /// Check if a language hint is in the valid language list.
  #[must_use]
  pub fn is_valid_language(&self, lang: &str) -> bool {
    self.valid_languages.iter().any(|valid| valid == lang)
  }

  /// Directory the engine feature file is read from.
  #[must_use]
  pub fn engine_config_dir(&self) -> PathBuf {
    self
      .config_path
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
  }

  /// Resolve the engine features to apply.
  ///
  /// Inline `features` win. Without them, [`ENGINE_CONFIG_FILE`] is read from
  /// [`HighlighterConfig::engine_config_dir`] if it exists; otherwise no
  /// features are applied.
  ///
  /// # Errors
  ///
  /// Returns an error if the feature file cannot be read or parsed, or if a
  /// feature is unknown or has invalid arguments.
  pub fn engine_features(&self) -> Result<Vec<EngineFeature>, ConfigError> {
    if !self.features.is_empty() {
      return Ok(EngineFeature::parse_all(&self.features)?);
    }

    let path = self.engine_config_dir().join(ENGINE_CONFIG_FILE);
    if !path.is_file() {
      log::debug!(
        "No engine config at {}, using engine defaults",
        path.display()
      );
      return Ok(Vec::new());
    }

    log::debug!("Loading engine features from {}", path.display());
    let content = fs::read_to_string(&path)?;
    let file: EngineConfigFile = toml::from_str(&content)?;
    Ok(EngineFeature::parse_all(&file.features)?)
  }

  /// Write the commented default configuration to `path`.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be written.
  pub fn generate_default_config<P: AsRef<Path>>(
    path: P,
  ) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, crate::templates::DEFAULT_TOML_TEMPLATE)?;
    log::info!("Wrote default configuration to {}", path.display());
    Ok(())
  }
}

/// `"none"`, `"false"` and blank values switch the fallback language off.
fn normalize_language(value: &str) -> Option<String> {
  match value.trim() {
    "" | "none" | "false" => None,
    lang => Some(lang.to_string()),
  }
}

fn deserialize_language<'de, D>(
  deserializer: D,
) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<String>::deserialize(deserializer)?;
  Ok(value.as_deref().and_then(normalize_language))
}

fn deserialize_layer_language<'de, D>(
  deserializer: D,
) -> Result<Option<Option<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  deserialize_language(deserializer).map(Some)
}

fn parse_list(value: &str) -> Vec<String> {
  value
    .split(',')
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(str::to_string)
    .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" | "on" => Ok(true),
    "false" | "no" | "0" | "off" => Ok(false),
    _ => {
      Err(ConfigError::InvalidValue {
        key:    key.to_string(),
        reason: format!("Invalid boolean '{value}'"),
      })
    },
  }
}

fn parse_feature_args(value: &str) -> Vec<FeatureArg> {
  parse_list(value)
    .into_iter()
    .map(|arg| {
      if let Ok(int) = arg.parse::<i64>() {
        FeatureArg::Int(int)
      } else if let Ok(flag) = arg.parse::<bool>() {
        FeatureArg::Bool(flag)
      } else {
        FeatureArg::Str(arg)
      }
    })
    .collect()
}

fn is_tag_name(name: &str) -> bool {
  let mut chars = name.chars();
  chars.next().is_some_and(|c| c.is_ascii_alphabetic())
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::useless_vec,
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use blockhl_engine::{HeaderType, LineNumbers};

  use super::*;

  #[test]
  fn test_defaults() {
    let config = HighlighterConfig::default();
    assert_eq!(config.valid_containers, vec!["pre"]);
    assert_eq!(
      config.container_map["pre"],
      ContainerMarkup::new("div class=\"code\"", "div")
    );
    assert!(config.is_valid_language("php"));
    assert!(!config.is_valid_language("cobol"));
    assert!(config.show_plain_text_button);
    assert!(config.default_language.is_none());
    config.validate().unwrap();
  }

  #[test]
  fn test_apply_overrides_boolean() {
    let mut config = HighlighterConfig::default();
    config
      .apply_overrides(&vec!["show_plain_text_button=no".to_string()])
      .unwrap();
    assert!(!config.show_plain_text_button);
  }

  #[test]
  fn test_apply_overrides_lists() {
    let mut config = HighlighterConfig::default();
    config
      .apply_overrides(&vec![
        "valid_containers=pre, code".to_string(),
        "valid_languages=".to_string(),
      ])
      .unwrap();
    assert_eq!(config.valid_containers, vec!["pre", "code"]);
    assert!(config.valid_languages.is_empty());
  }

  #[test]
  fn test_apply_overrides_default_language() {
    let mut config = HighlighterConfig::default();
    config.apply_override("default_language", "text").unwrap();
    assert_eq!(config.default_language.as_deref(), Some("text"));
    config.apply_override("default_language", "false").unwrap();
    assert!(config.default_language.is_none());
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = HighlighterConfig::default();
    let result = config.apply_overrides(&vec!["no_equals_sign".to_string()]);
    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected KEY=VALUE")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = HighlighterConfig::default();
    let err = config
      .apply_overrides(&vec!["unknown_key=value".to_string()])
      .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKey(ref key) if key == "unknown_key"));
    assert!(err.to_string().contains("'unknown_key'"));

    let err = config.apply_override("templates.footer", "x").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKey(_)));
  }

  #[test]
  fn test_apply_overrides_invalid_boolean() {
    let mut config = HighlighterConfig::default();
    let err = config
      .apply_override("show_plain_text_button", "maybe")
      .unwrap_err();
    assert!(err.to_string().contains("Invalid boolean"));
  }

  #[test]
  fn test_apply_override_container_map() {
    let mut config = HighlighterConfig::default();
    config
      .apply_override("container_map.code", "span class=\"code\"|span")
      .unwrap();
    assert_eq!(
      config.container_map["code"],
      ContainerMarkup::new("span class=\"code\"", "span")
    );

    config.apply_override("container_map.pre", "").unwrap();
    assert!(!config.container_map.contains_key("pre"));

    assert!(config.apply_override("container_map.pre", "div").is_err());
  }

  #[test]
  fn test_apply_override_features() {
    let mut config = HighlighterConfig::default();
    config
      .apply_override("features.enable_line_numbers", "GESHI_FANCY_LINE_NUMBERS, 2")
      .unwrap();
    config.apply_override("features.enable_classes", "").unwrap();
    assert_eq!(config.features["enable_line_numbers"], vec![
      FeatureArg::Str("GESHI_FANCY_LINE_NUMBERS".to_string()),
      FeatureArg::Int(2),
    ]);
    assert!(config.features["enable_classes"].is_empty());

    let err = config.apply_override("features.eval", "1").unwrap_err();
    assert!(matches!(err, ConfigError::Feature(_)));
  }

  #[test]
  fn test_apply_override_templates() {
    let mut config = HighlighterConfig::default();
    config
      .apply_override("templates.content", "<c>{{code}}</c>")
      .unwrap();
    let templates = config.templates.unwrap();
    assert_eq!(templates.content, "<c>{{code}}</c>");
    assert_eq!(templates.layout, crate::templates::DEFAULT_LAYOUT);
  }

  #[test]
  fn test_merge_only_touches_set_keys() {
    let mut config = HighlighterConfig::default();
    config.merge(ConfigLayer {
      show_plain_text_button: Some(false),
      valid_languages: Some(vec!["rust".to_string()]),
      default_language: Some(Some("text".to_string())),
      ..Default::default()
    });
    config.merge(ConfigLayer {
      config_path: Some(PathBuf::from("conf")),
      features: Some(IndexMap::from([(
        "set_tab_width".to_string(),
        vec![FeatureArg::Int(4)],
      )])),
      ..Default::default()
    });

    assert!(!config.show_plain_text_button);
    assert_eq!(config.valid_languages, vec!["rust"]);
    assert_eq!(config.default_language.as_deref(), Some("text"));
    assert_eq!(config.config_path, Some(PathBuf::from("conf")));
    assert_eq!(config.features.len(), 1);
    assert_eq!(config.valid_containers, vec!["pre"]);

    config.merge(ConfigLayer {
      default_language: Some(None),
      ..Default::default()
    });
    assert!(config.default_language.is_none());
  }

  #[test]
  fn test_layer_lists_replace() {
    let mut config = HighlighterConfig::default();
    config.merge(toml::from_str("valid_containers = [\"code\"]").unwrap());
    assert_eq!(config.valid_containers, vec!["code"]);

    config.merge(toml::from_str("[container_map.code]\nopen = \"span\"\nclose = \"span\"").unwrap());
    assert_eq!(config.container_map.len(), 1);
    assert_eq!(config.container_map["code"], ContainerMarkup::new("span", "span"));
  }

  #[test]
  fn test_no_fallback_language_spellings() {
    for spelling in ["none", "false", ""] {
      let layer: ConfigLayer =
        toml::from_str(&format!("default_language = \"{spelling}\"")).unwrap();
      assert_eq!(layer.default_language, Some(None), "{spelling:?}");

      let config: HighlighterConfig =
        serde_json::from_str(&format!(r#"{{"default_language": "{spelling}"}}"#))
          .unwrap();
      assert!(config.default_language.is_none(), "{spelling:?}");
    }

    let layer: ConfigLayer = toml::from_str("default_language = \"text\"").unwrap();
    assert_eq!(layer.default_language, Some(Some("text".to_string())));
    let layer: ConfigLayer = toml::from_str("").unwrap();
    assert_eq!(layer, ConfigLayer::default());
  }

  #[test]
  fn test_every_field_takes_an_override() {
    let mut config = HighlighterConfig::default();
    config
      .apply_overrides(&vec![
        "config_path=conf".to_string(),
        "features.set_tab_width=2".to_string(),
        "valid_containers=pre,code".to_string(),
        "container_map.code=span|span".to_string(),
        "valid_languages=rust".to_string(),
        "default_language=none".to_string(),
        "lang_attribute=data-lang".to_string(),
        "show_plain_text_button=off".to_string(),
        "templates.showplain=<a>Plain</a>".to_string(),
      ])
      .unwrap();

    assert_eq!(config.config_path, Some(PathBuf::from("conf")));
    assert_eq!(config.features["set_tab_width"], vec![FeatureArg::Int(2)]);
    assert_eq!(config.valid_containers, vec!["pre", "code"]);
    assert_eq!(config.container_map["code"], ContainerMarkup::new("span", "span"));
    assert_eq!(config.valid_languages, vec!["rust"]);
    assert!(config.default_language.is_none());
    assert_eq!(config.lang_attribute, "data-lang");
    assert!(!config.show_plain_text_button);
    assert_eq!(config.templates.unwrap().showplain, "<a>Plain</a>");

    let mut config = HighlighterConfig::default();
    for key in ["valid_languages.rust", "features", "container_map", "lang"] {
      assert!(
        matches!(
          config.apply_override(key, "x"),
          Err(ConfigError::UnknownKey(ref unknown)) if unknown == key
        ),
        "{key} was accepted"
      );
    }
  }

  #[test]
  fn test_validate_collects_errors() {
    let mut config = HighlighterConfig::default();
    config.valid_containers = vec!["pre".to_string(), "bad tag".to_string()];
    config.lang_attribute = "(lang".to_string();
    config.default_language = Some(String::new());

    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("'bad tag'"));
    assert!(message.contains("(lang"));
    assert!(message.contains("Default language"));
  }

  #[test]
  fn test_validate_rejects_unknown_features() {
    let mut config = HighlighterConfig::default();
    config
      .features
      .insert("call_user_func".to_string(), Vec::new());
    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("call_user_func"));
  }

  #[test]
  fn test_inline_features_are_resolved() {
    let mut config = HighlighterConfig::default();
    config.features.insert("set_header_type".to_string(), vec![
      FeatureArg::Str("GESHI_HEADER_NONE".to_string()),
    ]);
    config.features.insert("enable_line_numbers".to_string(), vec![
      FeatureArg::Str("GESHI_NORMAL_LINE_NUMBERS".to_string()),
    ]);

    assert_eq!(config.engine_features().unwrap(), vec![
      EngineFeature::SetHeaderType(HeaderType::None),
      EngineFeature::EnableLineNumbers(LineNumbers::Normal, 5),
    ]);
  }

  #[test]
  fn test_is_tag_name() {
    assert!(is_tag_name("pre"));
    assert!(is_tag_name("my-element"));
    assert!(is_tag_name("h1"));
    assert!(!is_tag_name("1h"));
    assert!(!is_tag_name(""));
    assert!(!is_tag_name("pre|code"));
  }
}
