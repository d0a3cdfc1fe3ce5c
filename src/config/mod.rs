//! Configuration for the portrait renderer
//!
//! Provides types and parsing for `portrait.toml`.

pub mod loader;
pub mod schema;

pub use loader::{load_config, merge_cli_overrides, CliOverrides, ConfigError};
pub use schema::*;
