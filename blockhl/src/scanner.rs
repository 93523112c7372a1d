//! Locating code blocks inside HTML.
//!
//! A block is an opening container tag carrying a language attribute,
//! followed by its content and the matching closing tag. Blocks that are never
//! closed run to the end of the input. Everything else is handed back as
//! verbatim text so that the caller can rebuild the page piece by piece.

use std::{collections::HashMap, ops::Range};

use regex::Regex;

/// A code block found in the input, borrowing from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeBlock<'h> {
  /// Full opening tag, attributes included.
  pub open_tag:  &'h str,
  /// Container tag name as written in the input.
  pub tag:       &'h str,
  /// Raw language attribute value.
  pub language:  &'h str,
  /// Raw text between the tags, still entity-encoded.
  pub content:   &'h str,
  /// Closing tag, empty when the block runs to the end of input.
  pub close_tag: &'h str,
}

/// A piece of scanned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'h> {
  /// Text passed through unchanged.
  Text(&'h str),
  /// A code block to be replaced.
  Block(CodeBlock<'h>),
}

/// Finds code blocks in HTML for a fixed set of container tags.
#[derive(Debug, Clone)]
pub struct BlockScanner {
  open_re:  Option<Regex>,
  close_re: HashMap<String, Regex>,
}

impl BlockScanner {
  /// Build a scanner for `containers`, reading the language from attributes
  /// matching the `lang_attribute` pattern.
  ///
  /// # Errors
  ///
  /// Returns an error if `lang_attribute` is not a valid regular expression.
  pub fn new(
    containers: &[String],
    lang_attribute: &str,
  ) -> Result<Self, regex::Error> {
    if containers.is_empty() {
      return Ok(Self {
        open_re:  None,
        close_re: HashMap::new(),
      });
    }

    let tags = containers
      .iter()
      .map(|tag| regex::escape(tag))
      .collect::<Vec<_>>()
      .join("|");
    let open_re = Regex::new(&format!(
      r#"<(?P<tag>{tags})[^>](?:{lang_attribute})=["']+(?P<lang>[^'".]*)["']+>"#
    ))?;

    let mut close_re = HashMap::with_capacity(containers.len());
    for tag in containers {
      let pattern = format!(r"</{}\s*>", regex::escape(tag));
      close_re.insert(tag.clone(), Regex::new(&pattern)?);
    }

    Ok(Self {
      open_re: Some(open_re),
      close_re,
    })
  }

  /// Split `html` into text and code block segments, in input order.
  ///
  /// The iterator is lazy; concatenating the raw text of every segment gives
  /// back the input.
  #[must_use]
  pub const fn segments<'s, 'h>(&'s self, html: &'h str) -> Segments<'s, 'h> {
    Segments {
      scanner: self,
      html,
      pos: 0,
      pending: None,
    }
  }

  /// Find the first block starting at or after `start`.
  fn find_block<'h>(
    &self,
    html: &'h str,
    start: usize,
  ) -> Option<(Range<usize>, CodeBlock<'h>)> {
    let caps = self.open_re.as_ref()?.captures_at(html, start)?;
    let open = caps.get(0)?;
    let tag = caps.name("tag")?.as_str();
    let language = caps.name("lang").map_or("", |m| m.as_str());

    let close = self
      .close_re
      .get(tag)
      .and_then(|re| re.find_at(html, open.end()));

    let (content, close_tag, end) = if let Some(close) = close {
      (&html[open.end()..close.start()], close.as_str(), close.end())
    } else {
      // Unterminated: runs to end of input, minus one final newline.
      let end = html.strip_suffix('\n').map_or(html.len(), str::len);
      let end = end.max(open.end());
      (&html[open.end()..end], "", end)
    };

    log::trace!(
      "Found <{tag}> block at {}..{end} with language '{language}'",
      open.start()
    );

    Some((open.start()..end, CodeBlock {
      open_tag: open.as_str(),
      tag,
      language,
      content,
      close_tag,
    }))
  }
}

/// Iterator over the [`Segment`]s of an HTML string.
#[derive(Debug, Clone)]
pub struct Segments<'s, 'h> {
  scanner: &'s BlockScanner,
  html:    &'h str,
  pos:     usize,
  pending: Option<CodeBlock<'h>>,
}

impl<'h> Iterator for Segments<'_, 'h> {
  type Item = Segment<'h>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(block) = self.pending.take() {
      return Some(Segment::Block(block));
    }
    if self.pos >= self.html.len() {
      return None;
    }

    let Some((range, block)) = self.scanner.find_block(self.html, self.pos)
    else {
      let rest = &self.html[self.pos..];
      self.pos = self.html.len();
      return Some(Segment::Text(rest));
    };

    let before = &self.html[self.pos..range.start];
    self.pos = range.end;
    if before.is_empty() {
      Some(Segment::Block(block))
    } else {
      self.pending = Some(block);
      Some(Segment::Text(before))
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use super::*;

  fn scanner(containers: &[&str]) -> BlockScanner {
    let containers: Vec<String> =
      containers.iter().map(|tag| (*tag).to_string()).collect();
    BlockScanner::new(&containers, "(?:lang|class)").unwrap()
  }

  fn blocks<'h>(scanner: &BlockScanner, html: &'h str) -> Vec<CodeBlock<'h>> {
    scanner
      .segments(html)
      .filter_map(|segment| {
        match segment {
          Segment::Block(block) => Some(block),
          Segment::Text(_) => None,
        }
      })
      .collect()
  }

  #[test]
  fn test_plain_text_is_one_segment() {
    let scanner = scanner(&["pre"]);
    let segments: Vec<_> = scanner.segments("<p>nothing here</p>").collect();
    assert_eq!(segments, vec![Segment::Text("<p>nothing here</p>")]);
    assert_eq!(scanner.segments("").count(), 0);
  }

  #[test]
  fn test_block_parts() {
    let scanner = scanner(&["pre"]);
    let html = "<p>A</p><pre lang=\"php\">echo 1;</pre ><p>B</p>";
    let segments: Vec<_> = scanner.segments(html).collect();
    assert_eq!(segments, vec![
      Segment::Text("<p>A</p>"),
      Segment::Block(CodeBlock {
        open_tag:  "<pre lang=\"php\">",
        tag:       "pre",
        language:  "php",
        content:   "echo 1;",
        close_tag: "</pre >",
      }),
      Segment::Text("<p>B</p>"),
    ]);
  }

  #[test]
  fn test_single_quotes_and_class_attribute() {
    let scanner = scanner(&["pre"]);
    let found = blocks(&scanner, "<pre lang='php'>a</pre><pre class=\"sql\">b</pre>");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].language, "php");
    assert_eq!(found[1].language, "sql");
  }

  #[test]
  fn test_content_spans_lines_and_stops_at_first_close() {
    let scanner = scanner(&["pre"]);
    let html = "<pre lang=\"c\">int a;\nint b;</pre>x<pre lang=\"c\">c</pre>";
    let found = blocks(&scanner, html);
    assert_eq!(found[0].content, "int a;\nint b;");
    assert_eq!(found[1].content, "c");
  }

  #[test]
  fn test_close_tag_must_match_open_tag() {
    let scanner = scanner(&["pre", "code"]);
    let found = blocks(&scanner, "<code lang=\"php\">a</pre>b</code>");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].tag, "code");
    assert_eq!(found[0].content, "a</pre>b");
  }

  #[test]
  fn test_unterminated_block_runs_to_end() {
    let scanner = scanner(&["pre"]);
    let segments: Vec<_> =
      scanner.segments("<pre lang=\"php\">echo 1;\n").collect();
    assert_eq!(segments.len(), 2);
    let Segment::Block(block) = segments[0] else {
      panic!("expected a block first");
    };
    assert_eq!(block.content, "echo 1;");
    assert_eq!(block.close_tag, "");
    assert_eq!(segments[1], Segment::Text("\n"));
  }

  #[test]
  fn test_tags_without_language_are_ignored() {
    let scanner = scanner(&["pre"]);
    assert!(blocks(&scanner, "<pre>x</pre><pre lang=php>y</pre>").is_empty());
  }

  #[test]
  fn test_language_stops_at_dot() {
    let scanner = scanner(&["pre"]);
    assert!(blocks(&scanner, "<pre lang=\"php.5\">x</pre>").is_empty());
  }

  #[test]
  fn test_no_containers_matches_nothing() {
    let scanner = BlockScanner::new(&[], "lang").unwrap();
    let segments: Vec<_> = scanner.segments("<pre lang=\"php\">x</pre>").collect();
    assert_eq!(segments, vec![Segment::Text("<pre lang=\"php\">x</pre>")]);
  }

  #[test]
  fn test_segments_rebuild_input() {
    let scanner = scanner(&["pre"]);
    let html = "a<pre lang=\"php\">b</pre>c<pre class=\"x\">d";
    let rebuilt: String = scanner
      .segments(html)
      .map(|segment| {
        match segment {
          Segment::Text(text) => text.to_string(),
          Segment::Block(block) => {
            format!("{}{}{}", block.open_tag, block.content, block.close_tag)
          },
        }
      })
      .collect();
    assert_eq!(rebuilt, html);
  }

  #[test]
  fn test_invalid_lang_attribute() {
    assert!(BlockScanner::new(&["pre".to_string()], "(lang").is_err());
  }
}
