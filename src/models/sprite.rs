//! Sprite sheet definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sprite sheet declared by a `spriteType` block.
///
/// Sprite definitions key the tile cache, so two definitions with identical
/// fields are the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SpriteDef {
    /// Catalog key, e.g. `GFX_character_background`
    pub name: String,
    /// Texture path relative to a content root, `/`-separated
    pub texture_file: String,
    /// Number of tiles laid out horizontally in the texture
    pub frame_count: i32,
    #[serde(default)]
    pub no_ref_count: bool,
}

impl SpriteDef {
    pub fn new(name: impl Into<String>, texture_file: impl Into<String>, frame_count: i32) -> Self {
        Self {
            name: name.into(),
            texture_file: normalize_texture_path(&texture_file.into()),
            frame_count,
            no_ref_count: false,
        }
    }

    /// Frame count as a tile total; non-positive counts have no tiles.
    pub fn tile_count(&self) -> usize {
        usize::try_from(self.frame_count).unwrap_or(0)
    }
}

impl fmt::Display for SpriteDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} frames{})",
            self.name,
            self.texture_file,
            self.frame_count,
            if self.no_ref_count { ", norefcount" } else { "" }
        )
    }
}

/// Turn a script texture path into a `/`-separated relative path.
///
/// Script files write Windows paths with doubled backslashes
/// (`gfx\\characters\\x.dds`); single backslashes are accepted too.
pub fn normalize_texture_path(raw: &str) -> String {
    raw.replace("\\\\", "/").replace('\\', "/")
}
