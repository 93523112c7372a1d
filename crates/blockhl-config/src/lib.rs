pub mod config;
pub mod error;
pub mod templates;

pub use config::{ConfigLayer, ContainerMarkup, HighlighterConfig};
pub use error::ConfigError;
pub use templates::Templates;
