//! Highlight the code blocks of an HTML file and print the result.
//!
//! ```sh
//! cargo run --example render -- page.html [blockhl.toml] [KEY=VALUE...]
//! ```
//!
//! Without a page a small built-in document is used. Set `RUST_LOG=debug` to
//! see what the highlighter does.
#![allow(clippy::print_stdout, reason = "Fine in examples")]

use std::{env, fs, path::PathBuf};

use blockhl::{Highlighter, HighlighterConfig};
use color_eyre::eyre::{Context, Result};

const DEMO_PAGE: &str = r#"<p>Some PHP:</p>
<pre lang="php">&lt;?php echo &quot;foo&quot;; ?&gt;</pre>
<p>Something unknown:</p>
<pre lang="cobol">DISPLAY 'HELLO'.</pre>"#;

fn main() -> Result<()> {
  color_eyre::install()?;
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("info"),
  )
  .init();

  let mut args = env::args().skip(1);
  let page = match args.next() {
    Some(path) => {
      fs::read_to_string(&path)
        .wrap_err_with(|| format!("Failed to read {path}"))?
    },
    None => DEMO_PAGE.to_string(),
  };

  let (files, overrides): (Vec<String>, Vec<String>) =
    args.partition(|arg| !arg.contains('='));
  let files: Vec<PathBuf> = files.into_iter().map(PathBuf::from).collect();

  let config = HighlighterConfig::load(&files, &overrides)
    .wrap_err("Failed to load configuration")?;
  let highlighter =
    Highlighter::new(config).wrap_err("Failed to create highlighter")?;

  let html = highlighter.highlight(&page)?;
  let css = highlighter.stylesheet()?;

  println!("<style>\n{css}\n</style>\n{html}");
  Ok(())
}
