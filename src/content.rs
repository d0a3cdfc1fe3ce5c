//! Content sources: the base game, add-ons, modifications and pre-extracted packs
//!
//! A source owns the catalog parsed from its own files only. Override
//! precedence between sources is decided by [`crate::catalog`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::PortraitData;
use crate::reader::{read_content_root, Warning};

/// File name of a pack manifest inside its pack root.
pub const PACK_MANIFEST: &str = "pack.json";

/// Where a source's textures come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A game-layout directory with `interface/` scripts and `gfx/` textures
    Directory,
    /// A pack root holding one PNG directory per sprite
    Pack,
}

/// Error loading a pack manifest.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read pack {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid pack manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk description of a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackManifest {
    pub name: String,
    #[serde(default)]
    pub data: PortraitData,
}

/// One override-capable origin of assets.
#[derive(Debug, Clone)]
pub struct ContentSource {
    pub name: String,
    /// Content root (pack root for packs)
    pub path: PathBuf,
    pub kind: SourceKind,
    pub data: PortraitData,
    pub warnings: Vec<Warning>,
    pub enabled: bool,
    pub disabled_reason: Option<String>,
}

impl ContentSource {
    /// Source with an already built catalog.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: SourceKind, data: PortraitData) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            data,
            warnings: Vec::new(),
            enabled: true,
            disabled_reason: None,
        }
    }

    /// Scan and parse a game-layout content root.
    pub fn load(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let mut source = Self::new(name, path, SourceKind::Directory, PortraitData::new());
        source.reload();
        source
    }

    /// Load a pack from its manifest file; the pack root is the manifest's directory.
    pub fn load_pack(manifest_path: &Path) -> Result<Self, ContentError> {
        let text = fs::read_to_string(manifest_path)
            .map_err(|source| ContentError::Io { path: manifest_path.to_path_buf(), source })?;
        let manifest: PackManifest = serde_json::from_str(&text)
            .map_err(|source| ContentError::Manifest { path: manifest_path.to_path_buf(), source })?;

        let root = manifest_path.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut source = Self::new(manifest.name, root, SourceKind::Pack, manifest.data);
        source.check_enabled();
        tracing::info!(pack = %source.name, path = %manifest_path.display(), "Loaded content pack");
        Ok(source)
    }

    /// Write this source's catalog as a pack manifest into `dir`.
    pub fn write_manifest(&self, dir: &Path) -> Result<PathBuf, ContentError> {
        let path = dir.join(PACK_MANIFEST);
        let manifest = PackManifest { name: self.name.clone(), data: self.data.clone() };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|source| ContentError::Manifest { path: path.clone(), source })?;
        fs::create_dir_all(dir).map_err(|source| ContentError::Io { path: dir.to_path_buf(), source })?;
        fs::write(&path, json).map_err(|source| ContentError::Io { path: path.clone(), source })?;
        Ok(path)
    }

    /// Replace the catalog wholesale by re-reading the content root.
    ///
    /// Packs have nothing to re-scan and keep their manifest catalog.
    pub fn reload(&mut self) {
        if self.kind == SourceKind::Directory {
            let result = read_content_root(&self.path);
            self.data = result.data;
            self.warnings = result.warnings;
            tracing::debug!(
                source = %self.name,
                sprites = self.data.sprites.len(),
                portrait_types = self.data.portrait_types.len(),
                warnings = self.warnings.len(),
                "Content source loaded"
            );
        }
        self.check_enabled();
    }

    /// Whether this source contributes anything to portraits.
    pub fn has_portrait_data(&self) -> bool {
        !self.data.portrait_types.is_empty()
            || !self.data.sprites.is_empty()
            || (self.kind == SourceKind::Directory && self.path.join("gfx").join("characters").is_dir())
    }

    pub fn disable(&mut self, reason: impl Into<String>) {
        self.enabled = false;
        self.disabled_reason = Some(reason.into());
    }

    fn check_enabled(&mut self) {
        if self.has_portrait_data() {
            self.enabled = true;
            self.disabled_reason = None;
        } else {
            tracing::info!(source = %self.name, "No portrait data found");
            self.disable("No portrait data found");
        }
    }
}
