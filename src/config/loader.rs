//! Configuration loading and discovery for `portrait.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PortraitConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name
pub const CONFIG_FILE: &str = "portrait.toml";

/// Directory under the XDG config home
pub const CONFIG_DIR: &str = "portrait-builder";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse portrait.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub game: Option<PathBuf>,
    /// Appended after the configured sources
    pub sources: Vec<PathBuf>,
    /// Appended after the configured packs
    pub packs: Vec<PathBuf>,
    pub scale: Option<u32>,
    pub rank: Option<String>,
    pub government: Option<String>,
}

/// Find portrait.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for portrait.toml
/// 2. Check XDG_CONFIG_HOME/portrait-builder/portrait.toml (or ~/.config/portrait-builder/portrait.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find portrait.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join(CONFIG_DIR).join(CONFIG_FILE);
    config_path.exists().then_some(config_path)
}

/// Find portrait.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a portrait.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns defaults.
/// Relative paths in the file are resolved against the file's directory.
pub fn load_config(path: Option<&Path>) -> Result<PortraitConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(PortraitConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<PortraitConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: PortraitConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = path.parent() {
        resolve_paths(&mut config, root);
    }
    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

fn resolve_paths(config: &mut PortraitConfig, root: &Path) {
    if let Some(dir) = config.game.dir.as_mut() {
        *dir = resolve_path(root, dir);
    }
    for path in config.content.sources.iter_mut().chain(config.content.packs.iter_mut()) {
        *path = resolve_path(root, path);
    }
}

/// Merge CLI overrides into a configuration and re-validate it.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PortraitConfig, overrides: &CliOverrides) -> Result<(), ConfigError> {
    if let Some(ref game) = overrides.game {
        config.game.dir = Some(game.clone());
    }
    config.content.sources.extend(overrides.sources.iter().cloned());
    config.content.packs.extend(overrides.packs.iter().cloned());
    if let Some(scale) = overrides.scale {
        config.render.scale = scale;
    }
    if let Some(ref rank) = overrides.rank {
        config.render.default_rank = rank.clone();
    }
    if let Some(ref government) = overrides.government {
        config.render.default_government = government.clone();
    }

    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// Resolve a path relative to the config root.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
