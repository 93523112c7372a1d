//! Assembling replacement markup for a code block.
//!
//! A replaced block is built from four parts: the optional plain text toggle,
//! the (possibly renamed) opening tag, the block content and the closing tag.
//! The parts are joined through the configured templates, which default to a
//! plain concatenation.

use std::collections::HashMap;

use blockhl_config::{ContainerMarkup, Templates};
use regex::{NoExpand, Regex};
use tera::{Context, Tera};

use crate::{error::HighlightResult, scanner::CodeBlock};

const LAYOUT: &str = "layout";
const CONTENT: &str = "content";
const SHOWPLAIN: &str = "showplain";

/// Renames container tags according to the container map.
#[derive(Debug, Clone, Default)]
pub struct ContainerMapper {
  rules: HashMap<String, (Regex, ContainerMarkup)>,
}

impl ContainerMapper {
  /// Build a mapper from a tag name to replacement markup table.
  ///
  /// # Errors
  ///
  /// Returns an error if a tag name cannot be turned into a pattern.
  pub fn new(
    container_map: &HashMap<String, ContainerMarkup>,
  ) -> Result<Self, regex::Error> {
    let mut rules = HashMap::with_capacity(container_map.len());
    for (tag, markup) in container_map {
      let re = Regex::new(&format!(r"\b{}\b", regex::escape(tag)))?;
      rules.insert(tag.clone(), (re, markup.clone()));
    }
    Ok(Self { rules })
  }

  /// Return the opening and closing tags of `block`, renamed if its container
  /// has a mapping.
  #[must_use]
  pub fn map(&self, block: &CodeBlock<'_>) -> (String, String) {
    let Some((re, markup)) = self.rules.get(block.tag) else {
      return (block.open_tag.to_string(), block.close_tag.to_string());
    };
    (
      re.replace_all(block.open_tag, NoExpand(&markup.open))
        .into_owned(),
      re.replace_all(block.close_tag, NoExpand(&markup.close))
        .into_owned(),
    )
  }
}

/// Parts of a replaced block, already in their final form.
#[derive(Debug, Clone, Copy)]
pub struct BlockParts<'a> {
  pub open:      &'a str,
  pub code:      &'a str,
  pub close:     &'a str,
  pub showplain: bool,
}

/// Compiled block templates.
#[derive(Debug, Clone)]
pub struct BlockTemplates {
  tera: Tera,
}

impl BlockTemplates {
  /// Compile the given templates.
  ///
  /// # Errors
  ///
  /// Returns an error if a fragment uses anything but its own placeholders,
  /// or does not parse.
  pub fn new(templates: &Templates) -> HighlightResult<Self> {
    templates.validate()?;
    let mut tera = Tera::default();
    // Names carry no extension so tera never escapes the substituted markup.
    tera.add_raw_template(LAYOUT, &templates.layout)?;
    tera.add_raw_template(CONTENT, &templates.content)?;
    tera.add_raw_template(SHOWPLAIN, &templates.showplain)?;
    Ok(Self { tera })
  }

  /// Render one block.
  ///
  /// # Errors
  ///
  /// Returns an error if a template fails to render.
  pub fn render(&self, parts: &BlockParts<'_>) -> HighlightResult<String> {
    let showplain = if parts.showplain {
      self.tera.render(SHOWPLAIN, &Context::new())?
    } else {
      String::new()
    };

    let mut content_ctx = Context::new();
    content_ctx.insert("code", parts.code);
    let content = self.tera.render(CONTENT, &content_ctx)?;

    let mut layout_ctx = Context::new();
    layout_ctx.insert("showplain", &showplain);
    layout_ctx.insert("open", parts.open);
    layout_ctx.insert("content", &content);
    layout_ctx.insert("close", parts.close);
    Ok(self.tera.render(LAYOUT, &layout_ctx)?)
  }
}
