//! Configuration schema types for `portrait.toml`
//!
//! Defines the structure and validation rules for portrait rendering configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::character::{Government, Rank};

/// Largest accepted upscale factor
pub const MAX_SCALE: u32 = 16;

/// Root of `portrait.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortraitConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Base game installation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Game directory; the lowest-priority content source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Additional content, in activation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Add-on and modification roots
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Pack manifests
    #[serde(default)]
    pub packs: Vec<PathBuf>,
}

/// Render defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Nearest-neighbour upscale factor
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// Rank name, see [`Rank`]
    #[serde(default = "default_rank")]
    pub default_rank: String,
    /// Government name, see [`Government`]
    #[serde(default = "default_government")]
    pub default_government: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { scale: default_scale(), default_rank: default_rank(), default_government: default_government() }
    }
}

fn default_scale() -> u32 {
    1
}

fn default_rank() -> String {
    Rank::Duke.to_string()
}

fn default_government() -> String {
    Government::Feudal.to_string()
}

/// Logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// A single configuration problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "render.scale")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "portrait.toml: '{}' {}", self.field, self.message)
    }
}

impl PortraitConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.render.scale == 0 || self.render.scale > MAX_SCALE {
            errors.push(ConfigValidationError {
                field: "render.scale".to_string(),
                message: format!("must be between 1 and {}", MAX_SCALE),
            });
        }
        if let Err(message) = self.render.default_rank.parse::<Rank>() {
            errors.push(ConfigValidationError { field: "render.default_rank".to_string(), message });
        }
        if let Err(message) = self.render.default_government.parse::<Government>() {
            errors.push(ConfigValidationError { field: "render.default_government".to_string(), message });
        }
        if self.log.level.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "log.level".to_string(),
                message: "must be a non-empty filter".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Default rank; falls back to [`Rank::Duke`] on an invalid name.
    pub fn rank(&self) -> Rank {
        self.render.default_rank.parse().unwrap_or(Rank::Duke)
    }

    /// Default government; falls back to [`Government::Feudal`] on an invalid name.
    pub fn government(&self) -> Government {
        self.render.default_government.parse().unwrap_or_default()
    }
}
