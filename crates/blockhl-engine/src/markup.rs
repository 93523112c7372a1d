//! Markup assembly shared by engine backends.
//!
//! Backends produce one HTML fragment per source line. This module turns
//! those fragments into the final list or block markup, honouring the header
//! type and numbering settings.

use std::{fmt::Write, sync::OnceLock};

use regex::Regex;

use crate::types::{HeaderType, LineNumbers};

/// Layout settings applied when joining highlighted lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout<'a> {
  pub header:       HeaderType,
  pub line_numbers: LineNumbers,
  pub fancy_step:   usize,
  pub start_line:   usize,
  /// Class put on the outermost element, usually the language name.
  pub class:        &'a str,
  pub id:           Option<&'a str>,
}

/// Expand hard tabs to spaces, aligning to multiples of `width` columns.
#[must_use]
pub fn expand_tabs(source: &str, width: usize) -> String {
  if !source.contains('\t') || width == 0 {
    return source.to_string();
  }

  let mut out = String::with_capacity(source.len());
  let mut column = 0;
  for ch in source.chars() {
    match ch {
      '\t' => {
        let pad = width - (column % width);
        out.extend(std::iter::repeat_n(' ', pad));
        column += pad;
      },
      '\n' => {
        out.push(ch);
        column = 0;
      },
      _ => {
        out.push(ch);
        column += 1;
      },
    }
  }
  out
}

/// Split span markup into lines where every line is self-contained.
///
/// Spans that are still open at a line break are closed at the end of that
/// line and reopened at the start of the next one, so that each returned
/// fragment can be wrapped in its own list item.
#[must_use]
pub fn split_balanced_lines(html: &str) -> Vec<String> {
  static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
  let Some(tag_re) = TAG_RE
    .get_or_init(|| Regex::new(r"<span[^>]*>|</span>").ok())
    .as_ref()
  else {
    return html.split('\n').map(str::to_string).collect();
  };

  let mut lines = Vec::new();
  let mut open: Vec<&str> = Vec::new();
  let mut current = String::new();
  let mut last = 0;

  for tag in tag_re.find_iter(html) {
    push_text(&html[last..tag.start()], &open, &mut current, &mut lines);
    let text = tag.as_str();
    if text == "</span>" {
      open.pop();
    } else {
      open.push(text);
    }
    current.push_str(text);
    last = tag.end();
  }
  push_text(&html[last..], &open, &mut current, &mut lines);
  lines.push(current);

  lines
}

fn push_text(
  text: &str,
  open: &[&str],
  current: &mut String,
  lines: &mut Vec<String>,
) {
  let mut parts = text.split('\n');
  if let Some(first) = parts.next() {
    current.push_str(first);
  }
  for part in parts {
    for _ in open {
      current.push_str("</span>");
    }
    lines.push(std::mem::take(current));
    for tag in open {
      current.push_str(tag);
    }
    current.push_str(part);
  }
}

/// Join highlighted lines into the final markup.
#[must_use]
pub fn render(lines: &[String], layout: &Layout<'_>) -> String {
  let id_attr = layout
    .id
    .map(|id| format!(" id=\"{}\"", html_escape::encode_double_quoted_attribute(id)))
    .unwrap_or_default();
  let class_attr = format!(
    " class=\"{}\"",
    html_escape::encode_double_quoted_attribute(layout.class)
  );

  if !layout.line_numbers.is_enabled() {
    let body = lines.join("\n");
    return match layout.header {
      HeaderType::None => body,
      HeaderType::Div => format!("<div{class_attr}{id_attr}>{body}</div>"),
      HeaderType::Pre | HeaderType::PreValid => {
        format!("<pre{class_attr}{id_attr}>{body}</pre>")
      },
    };
  }

  let items = list_items(lines, layout);
  let start_attr = if layout.start_line == 1 {
    String::new()
  } else {
    format!(" start=\"{}\"", layout.start_line)
  };

  match layout.header {
    HeaderType::None => format!("<ol{class_attr}{id_attr}{start_attr}>{items}</ol>"),
    HeaderType::Div | HeaderType::PreValid => {
      format!("<div{class_attr}{id_attr}><ol{start_attr}>{items}</ol></div>")
    },
    HeaderType::Pre => {
      format!("<pre{class_attr}{id_attr}><ol{start_attr}>{items}</ol></pre>")
    },
  }
}

fn list_items(lines: &[String], layout: &Layout<'_>) -> String {
  let step = layout.fancy_step.max(1);
  let mut items = String::new();
  for (index, line) in lines.iter().enumerate() {
    let number = layout.start_line + index;
    let level =
      if layout.line_numbers == LineNumbers::Fancy && number % step == 0 {
        2
      } else {
        1
      };
    let content = if line.is_empty() { "&nbsp;" } else { line.as_str() };
    if index > 0 {
      items.push('\n');
    }
    let _ = write!(
      items,
      "<li class=\"li{level}\"><div class=\"de{level}\">{content}</div></li>"
    );
  }
  items
}

/// Rules for the list markup, appended to backend stylesheets.
pub const LIST_CSS: &str = "li.li1, li.li2 { vertical-align: top; }\nli.li2 \
                            { font-weight: bold; }\ndiv.de1, div.de2 { \
                            white-space: pre; }";
