//! Typed engine features.
//!
//! Features are written in configuration as an ordered table of method name
//! to positional arguments, e.g.
//!
//! ```toml
//! [features]
//! set_header_type = ["GESHI_HEADER_NONE"]
//! enable_line_numbers = ["GESHI_FANCY_LINE_NUMBERS", 2]
//! enable_classes = []
//! ```
//!
//! Each entry is checked against a fixed allow-list and parsed into an
//! [`EngineFeature`]. String arguments that name a known constant are replaced
//! by the constant's integer value before parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  error::{EngineError, EngineResult},
  types::{HeaderType, LineNumbers},
};

/// Named integer constants accepted in feature arguments.
pub const NAMED_CONSTANTS: &[(&str, i64)] = &[
  ("GESHI_HEADER_NONE", 0),
  ("GESHI_HEADER_DIV", 1),
  ("GESHI_HEADER_PRE", 2),
  ("GESHI_HEADER_PRE_VALID", 3),
  ("GESHI_NO_LINE_NUMBERS", 0),
  ("GESHI_NORMAL_LINE_NUMBERS", 1),
  ("GESHI_FANCY_LINE_NUMBERS", 2),
];

/// Look up a named constant.
#[must_use]
pub fn resolve_constant(name: &str) -> Option<i64> {
  NAMED_CONSTANTS
    .iter()
    .find(|(constant, _)| *constant == name)
    .map(|(_, value)| *value)
}

/// A single positional argument as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureArg {
  Int(i64),
  Bool(bool),
  Str(String),
}

impl FeatureArg {
  /// Replace a string naming a known constant with its integer value.
  #[must_use]
  pub fn resolved(&self) -> Self {
    match self {
      Self::Str(name) => {
        resolve_constant(name).map_or_else(|| self.clone(), Self::Int)
      },
      other => other.clone(),
    }
  }
}

impl fmt::Display for FeatureArg {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(value) => write!(f, "{value}"),
      Self::Bool(value) => write!(f, "{value}"),
      Self::Str(value) => write!(f, "\"{value}\""),
    }
  }
}

impl From<i64> for FeatureArg {
  fn from(value: i64) -> Self {
    Self::Int(value)
  }
}

impl From<bool> for FeatureArg {
  fn from(value: bool) -> Self {
    Self::Bool(value)
  }
}

impl From<&str> for FeatureArg {
  fn from(value: &str) -> Self {
    Self::Str(value.to_string())
  }
}

/// Engine configuration option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFeature {
  SetHeaderType(HeaderType),
  EnableLineNumbers(LineNumbers, usize),
  StartLineNumbersAt(usize),
  EnableClasses(bool),
  SetTabWidth(usize),
  SetOverallClass(String),
  SetOverallId(String),
  SetTheme(String),
}

/// Method names accepted in feature tables.
pub const KNOWN_FEATURES: &[&str] = &[
  "set_header_type",
  "enable_line_numbers",
  "start_line_numbers_at",
  "enable_classes",
  "set_tab_width",
  "set_overall_class",
  "set_overall_id",
  "set_theme",
];

impl EngineFeature {
  /// Parse a feature from its method name and raw arguments.
  ///
  /// # Errors
  ///
  /// Returns [`EngineError::UnknownFeature`] for names outside
  /// [`KNOWN_FEATURES`] and [`EngineError::InvalidArguments`] when the
  /// arguments do not fit the method.
  pub fn parse(name: &str, args: &[FeatureArg]) -> EngineResult<Self> {
    let args: Vec<FeatureArg> = args.iter().map(FeatureArg::resolved).collect();
    let parser = ArgParser { feature: name, args: &args };

    let feature = match name {
      "set_header_type" => {
        parser.arity(1, 1)?;
        let code = parser.int(0)?;
        let header = HeaderType::from_code(code)
          .ok_or_else(|| parser.invalid(format!("unknown header type {code}")))?;
        Self::SetHeaderType(header)
      },
      "enable_line_numbers" => {
        parser.arity(1, 2)?;
        let code = parser.int(0)?;
        let mode = LineNumbers::from_code(code).ok_or_else(|| {
          parser.invalid(format!("unknown line number mode {code}"))
        })?;
        let step = if args.len() == 2 { parser.positive(1)? } else { 5 };
        Self::EnableLineNumbers(mode, step)
      },
      "start_line_numbers_at" => {
        parser.arity(1, 1)?;
        Self::StartLineNumbersAt(parser.positive(0)?)
      },
      "enable_classes" => {
        parser.arity(0, 1)?;
        let flag = if args.is_empty() { true } else { parser.flag(0)? };
        Self::EnableClasses(flag)
      },
      "set_tab_width" => {
        parser.arity(1, 1)?;
        Self::SetTabWidth(parser.positive(0)?)
      },
      "set_overall_class" => {
        parser.arity(1, 1)?;
        Self::SetOverallClass(parser.string(0)?)
      },
      "set_overall_id" => {
        parser.arity(1, 1)?;
        Self::SetOverallId(parser.string(0)?)
      },
      "set_theme" => {
        parser.arity(1, 1)?;
        Self::SetTheme(parser.string(0)?)
      },
      _ => return Err(EngineError::UnknownFeature(name.to_string())),
    };

    Ok(feature)
  }

  /// Parse every entry of an ordered feature table, keeping its order.
  ///
  /// # Errors
  ///
  /// Returns the first error reported by [`EngineFeature::parse`].
  pub fn parse_all<'a, I>(entries: I) -> EngineResult<Vec<Self>>
  where
    I: IntoIterator<Item = (&'a String, &'a Vec<FeatureArg>)>,
  {
    entries
      .into_iter()
      .map(|(name, args)| Self::parse(name, args))
      .collect()
  }
}

struct ArgParser<'a> {
  feature: &'a str,
  args:    &'a [FeatureArg],
}

impl ArgParser<'_> {
  fn invalid(&self, reason: String) -> EngineError {
    EngineError::InvalidArguments {
      feature: self.feature.to_string(),
      reason,
    }
  }

  fn arity(&self, min: usize, max: usize) -> EngineResult<()> {
    let len = self.args.len();
    if len < min || len > max {
      let expected = if min == max {
        format!("{min}")
      } else {
        format!("{min} to {max}")
      };
      return Err(
        self.invalid(format!("expected {expected} argument(s), got {len}")),
      );
    }
    Ok(())
  }

  fn int(&self, index: usize) -> EngineResult<i64> {
    match self.args.get(index) {
      Some(FeatureArg::Int(value)) => Ok(*value),
      Some(other) => {
        Err(self.invalid(format!(
          "argument {} must be an integer or a known constant, got {other}",
          index + 1
        )))
      },
      None => Err(self.invalid(format!("missing argument {}", index + 1))),
    }
  }

  fn positive(&self, index: usize) -> EngineResult<usize> {
    let value = self.int(index)?;
    usize::try_from(value)
      .ok()
      .filter(|value| *value > 0)
      .ok_or_else(|| {
        self.invalid(format!(
          "argument {} must be a positive integer, got {value}",
          index + 1
        ))
      })
  }

  fn flag(&self, index: usize) -> EngineResult<bool> {
    match self.args.get(index) {
      Some(FeatureArg::Bool(value)) => Ok(*value),
      Some(FeatureArg::Int(value)) => Ok(*value != 0),
      Some(other) => {
        Err(self.invalid(format!(
          "argument {} must be a boolean, got {other}",
          index + 1
        )))
      },
      None => Err(self.invalid(format!("missing argument {}", index + 1))),
    }
  }

  fn string(&self, index: usize) -> EngineResult<String> {
    match self.args.get(index) {
      Some(FeatureArg::Str(value)) => Ok(value.clone()),
      Some(other) => {
        Err(self.invalid(format!(
          "argument {} must be a string, got {other}",
          index + 1
        )))
      },
      None => Err(self.invalid(format!("missing argument {}", index + 1))),
    }
  }
}
