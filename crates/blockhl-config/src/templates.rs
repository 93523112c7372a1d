use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Anchor inserted before each block when the plain text toggle is enabled.
pub const PLAIN_TEXT_BUTTON: &str =
  r##"<a href="#null" class="geshi-plain-text">Show Plain Text</a>"##;

pub const DEFAULT_LAYOUT: &str = "{{showplain}}{{open}}{{content}}{{close}}";
pub const DEFAULT_CONTENT: &str = "{{code}}";

/// Markup fragments used to assemble each rewritten block.
///
/// `layout` receives `{{showplain}}`, `{{open}}`, `{{content}}` and
/// `{{close}}`; `content` receives `{{code}}`; `showplain` is the toggle
/// markup and takes no placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Templates {
  pub layout:    String,
  pub content:   String,
  pub showplain: String,
}

impl Default for Templates {
  fn default() -> Self {
    Self {
      layout:    DEFAULT_LAYOUT.to_string(),
      content:   DEFAULT_CONTENT.to_string(),
      showplain: PLAIN_TEXT_BUTTON.to_string(),
    }
  }
}

impl Templates {
  /// Placeholders each fragment may reference.
  pub const LAYOUT_PLACEHOLDERS: &[&str] =
    &["showplain", "open", "content", "close"];
  pub const CONTENT_PLACEHOLDERS: &[&str] = &["code"];
  pub const SHOWPLAIN_PLACEHOLDERS: &[&str] = &[];

  /// Iterate over `(name, source)` for every fragment.
  pub fn fragments(&self) -> impl Iterator<Item = (&'static str, &str)> {
    [
      ("layout", self.layout.as_str()),
      ("content", self.content.as_str()),
      ("showplain", self.showplain.as_str()),
    ]
    .into_iter()
  }

  /// Check that every fragment is plain markup with placeholders.
  ///
  /// Fragments are substituted literally: the only accepted expressions are
  /// bare `{{name}}` placeholders from the fragment's own list. Tags (`{%`),
  /// comments (`{#`), filters, function calls and unterminated `{{` are all
  /// rejected.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Template`] naming the first offending fragment.
  pub fn validate(&self) -> Result<(), ConfigError> {
    for (name, source) in self.fragments() {
      let allowed = match name {
        "layout" => Self::LAYOUT_PLACEHOLDERS,
        "content" => Self::CONTENT_PLACEHOLDERS,
        _ => Self::SHOWPLAIN_PLACEHOLDERS,
      };

      if let Some(delimiter) = ["{%", "{#"]
        .into_iter()
        .find(|delimiter| source.contains(delimiter))
      {
        return Err(ConfigError::Template(format!(
          "'{delimiter}' is not allowed in '{name}' template, only \
           placeholders are substituted"
        )));
      }

      let (found, rest) = split_placeholders(source);
      if rest.contains("{{") {
        return Err(ConfigError::Template(format!(
          "Unterminated placeholder in '{name}' template"
        )));
      }
      for placeholder in found {
        if !allowed.contains(&placeholder) {
          return Err(ConfigError::Template(format!(
            "Unknown placeholder '{{{{{placeholder}}}}}' in '{name}' template"
          )));
        }
      }
    }
    Ok(())
  }
}

fn placeholder_re() -> Option<&'static Regex> {
  static PLACEHOLDER_RE: OnceLock<Option<Regex>> = OnceLock::new();
  PLACEHOLDER_RE
    .get_or_init(|| Regex::new(r"(?s)\{\{(.*?)\}\}").ok())
    .as_ref()
}

/// Trimmed contents of every `{{ ... }}` expression in `source`, in order.
#[must_use]
pub fn placeholders(source: &str) -> Vec<&str> {
  split_placeholders(source).0
}

/// Expressions in `source`, plus the text left once they are removed.
fn split_placeholders(source: &str) -> (Vec<&str>, String) {
  let Some(re) = placeholder_re() else {
    return (Vec::new(), source.to_string());
  };
  let found = re
    .captures_iter(source)
    .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
    .collect();
  (found, re.replace_all(source, "").into_owned())
}

/// Default configuration template in TOML, with comments explaining each
/// field.
pub const DEFAULT_TOML_TEMPLATE: &str = r##"# blockhl configuration file

# Elements that may contain highlightable code.
valid_containers = ["pre"]

# Languages that will be highlighted. Blocks with other language hints are
# left untouched unless `default_language` is set.
valid_languages = [
  "css", "html", "php", "javascript", "python", "sql", "ruby", "coffeescript",
  "bash", "rust", "go", "c", "yaml", "sass", "lua", "dart", "xml", "json",
]

# Language used when a block's hint is not in `valid_languages`.
# default_language = "text"

# Regular expression matching the attribute that carries the language hint.
lang_attribute = "(?:lang|class)"

# Insert a "Show Plain Text" anchor before every block.
show_plain_text_button = true

# Directory containing `highlight.toml`, only read when `features` is empty.
# config_path = "config"

# Replace container tags, e.g. <pre> becomes <div class="code">.
[container_map.pre]
open = 'div class="code"'
close = "div"

# Engine features, applied in order. Strings naming known constants such as
# GESHI_HEADER_NONE are replaced by their numeric values.
[features]
# set_header_type = ["GESHI_HEADER_NONE"]
# enable_line_numbers = ["GESHI_FANCY_LINE_NUMBERS", 2]
# enable_classes = []
# set_tab_width = [4]

# Markup used to assemble each block.
# [templates]
# layout = "{{showplain}}{{open}}{{content}}{{close}}"
# content = "{{code}}"
# showplain = '<a href="#null" class="geshi-plain-text">Show Plain Text</a>'
"##;

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_placeholders_are_extracted_in_order() {
    assert_eq!(placeholders("<w>{{showplain}}{{ open }}</w>"), vec![
      "showplain",
      "open"
    ]);
    assert_eq!(placeholders("{{ code | upper }}"), vec!["code | upper"]);
    assert!(placeholders("no placeholders").is_empty());
  }

  #[test]
  fn test_default_templates_validate() {
    Templates::default().validate().unwrap();
  }

  #[test]
  fn test_unknown_placeholder_is_rejected() {
    let templates = Templates {
      content: "<c>{{open}}</c>".to_string(),
      ..Default::default()
    };
    let err = templates.validate().unwrap_err();
    assert!(err.to_string().contains("{{open}}"));
    assert!(err.to_string().contains("content"));
  }

  #[test]
  fn test_placeholder_expressions_are_rejected() {
    for content in [
      "[{{ get_env(name=\"HOME\") }}]{{code}}",
      "{{ code | upper }}",
      "{{ code.len }}",
    ] {
      let templates = Templates {
        content: content.to_string(),
        ..Default::default()
      };
      let err = templates.validate().unwrap_err();
      assert!(
        err.to_string().contains("Unknown placeholder"),
        "{content} was accepted"
      );
    }
  }

  #[test]
  fn test_tags_and_comments_are_rejected() {
    let templates = Templates {
      layout: "{% if open %}{{open}}{% endif %}{{content}}{{close}}"
        .to_string(),
      ..Default::default()
    };
    assert!(templates.validate().unwrap_err().to_string().contains("{%"));

    let templates = Templates {
      showplain: "<a href=\"#null\">{# toggle</a>".to_string(),
      ..Default::default()
    };
    let err = templates.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Template(_)));
    assert!(err.to_string().contains("showplain"));
  }

  #[test]
  fn test_unterminated_placeholder_is_rejected() {
    let templates = Templates {
      content: "<c>{{ code</c>".to_string(),
      ..Default::default()
    };
    assert!(
      templates
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Unterminated")
    );
  }

  #[test]
  fn test_default_toml_template_parses() {
    let config: crate::HighlighterConfig =
      toml::from_str(DEFAULT_TOML_TEMPLATE).unwrap();
    assert_eq!(config.valid_containers, vec!["pre"]);
    assert!(config.features.is_empty());
  }
}
