use std::{fmt::Write, sync::OnceLock};

use regex::Regex;

/// Convert numbered list output from an engine into a two column table.
///
/// Every `<li class="liN">` item becomes one row of the code column, numbered
/// from one in the left column. Items are matched one per line, so markup that
/// does not keep each item on its own line produces fewer rows or none.
#[must_use]
pub fn convert_to_table(highlighted: &str) -> String {
  static LINE_RE: OnceLock<Option<Regex>> = OnceLock::new();
  let lines: Vec<&str> = LINE_RE
    .get_or_init(|| Regex::new(r#"<li\s*class="li\d">(.*)</li>"#).ok())
    .as_ref()
    .map(|re| {
      re.captures_iter(highlighted)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
    })
    .unwrap_or_default();

  let mut numbers = String::new();
  for number in 1..=lines.len() {
    if number > 1 {
      numbers.push('\n');
    }
    let _ = write!(numbers, "<div class=\"de1\">{number}</div>");
  }

  format!(
    "<table class=\"code\" cellspacing=\"0\" cellpadding=\"0\">\n<tbody>\n\t<tr><td \
     class=\"code-numbers\">{numbers}</td>\n\t<td \
     class=\"code-block\">{}</td></tr>\n</tbody>\n</table>",
    lines.join("\n")
  )
}
