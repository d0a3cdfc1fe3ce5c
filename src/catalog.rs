//! Merged catalog of the active content and its tile cache
//!
//! Sources are merged in activation order, later sources overriding earlier
//! ones key by key. Any change to the active set builds a new
//! [`Generation`] (catalog plus a fresh tile cache) and publishes it in one
//! swap, so renders always see a consistent pair.

use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

use crate::character::Character;
use crate::content::ContentSource;
use crate::models::{PortraitData, PortraitType};
use crate::render::{render_portrait, Portrait};
use crate::sprite_cache::SpriteCache;

/// Error for lookups that no render can recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("No portrait types in the active content")]
    Empty,
    #[error("Portrait type not found: {0}")]
    PortraitTypeNotFound(String),
}

/// Merge the enabled sources, last one winning, then apply offset corrections once.
pub fn merge(sources: &[ContentSource]) -> PortraitData {
    let mut merged = PortraitData::new();
    for source in sources.iter().filter(|s| s.enabled) {
        merged.merge_with(&source.data);
    }
    merged.apply_offsets();

    tracing::debug!(
        sources = sources.len(),
        sprites = merged.sprites.len(),
        portrait_types = merged.portrait_types.len(),
        offsets = merged.offsets.len(),
        "Merged content"
    );
    merged
}

/// One immutable snapshot of the active content.
#[derive(Debug)]
pub struct Generation {
    pub id: u64,
    /// Enabled sources in activation order
    pub sources: Vec<ContentSource>,
    pub catalog: PortraitData,
    pub cache: SpriteCache,
}

impl Generation {
    pub fn build(id: u64, sources: &[ContentSource]) -> Self {
        let sources: Vec<ContentSource> = sources.iter().filter(|s| s.enabled).cloned().collect();
        let catalog = merge(&sources);
        let cache = SpriteCache::for_sources(&sources);
        Self { id, sources, catalog, cache }
    }

    pub fn portrait_type(&self, base: &str, overlay: Option<&str>) -> Result<PortraitType, CatalogError> {
        self.catalog.portrait_type(base, overlay)
    }

    pub fn render(&self, character: &Character) -> Result<Portrait, CatalogError> {
        render_portrait(character, &self.catalog, &self.cache)
    }
}

/// Owner of the content sources and the currently published generation.
#[derive(Debug)]
pub struct ContentManager {
    sources: Mutex<Vec<ContentSource>>,
    current: RwLock<Arc<Generation>>,
}

impl ContentManager {
    pub fn new(sources: Vec<ContentSource>) -> Self {
        let generation = Generation::build(0, &sources);
        Self { sources: Mutex::new(sources), current: RwLock::new(Arc::new(generation)) }
    }

    /// The published generation. Holders keep it alive across later swaps.
    pub fn current(&self) -> Arc<Generation> {
        Arc::clone(&self.current.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Snapshot of every known source, enabled or not.
    pub fn sources(&self) -> Vec<ContentSource> {
        self.sources.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Append a source with the highest priority.
    pub fn add_source(&self, source: ContentSource) -> Arc<Generation> {
        self.update(|sources| {
            sources.push(source);
            true
        })
    }

    /// Enable a source by name. Sources without portrait data stay disabled.
    pub fn activate(&self, name: &str) -> bool {
        let mut changed = false;
        self.update(|sources| {
            if let Some(source) = sources.iter_mut().find(|s| s.name == name && !s.enabled) {
                if source.has_portrait_data() {
                    source.enabled = true;
                    source.disabled_reason = None;
                    changed = true;
                }
            }
            changed
        });
        changed
    }

    pub fn deactivate(&self, name: &str) -> bool {
        let mut changed = false;
        self.update(|sources| {
            if let Some(source) = sources.iter_mut().find(|s| s.name == name && s.enabled) {
                source.disable("Deactivated");
                changed = true;
            }
            changed
        });
        changed
    }

    /// Re-read every source from disk and rebuild.
    pub fn reload(&self) -> Arc<Generation> {
        self.update(|sources| {
            sources.iter_mut().for_each(ContentSource::reload);
            true
        })
    }

    /// Apply `change` and, if it reports a change, publish a new generation.
    ///
    /// The source lock is held until the swap so rebuilds publish in order.
    fn update(&self, change: impl FnOnce(&mut Vec<ContentSource>) -> bool) -> Arc<Generation> {
        let mut sources = self.sources.lock().unwrap_or_else(|e| e.into_inner());
        if !change(&mut sources) {
            return self.current();
        }

        let id = self.current().id + 1;
        let generation = Arc::new(Generation::build(id, &sources));
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::clone(&generation);
        tracing::info!(generation = id, active = generation.sources.len(), "Published content generation");
        generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SourceKind;
    use crate::models::{Offset, SpriteDef};

    fn source(name: &str, sprites: &[(&str, i32)], types: &[(&str, &[&str])]) -> ContentSource {
        let mut data = PortraitData::new();
        for (sprite, frames) in sprites {
            data.insert_sprite(SpriteDef::new(*sprite, format!("{}/{}.dds", name, sprite), *frames));
        }
        for (type_name, layers) in types {
            data.insert_portrait_type(PortraitType {
                name: type_name.to_string(),
                layers: layers.iter().map(|l| l.parse().unwrap()).collect(),
                ..Default::default()
            });
        }
        ContentSource::new(name, format!("/content/{}", name), SourceKind::Directory, data)
    }

    #[test]
    fn test_merge_last_wins() {
        let a = source("a", &[("GFX_neck", 1), ("GFX_hair", 2)], &[("PORTRAIT_x", &["GFX_neck:d0"])]);
        let b = source("b", &[("GFX_neck", 5)], &[("PORTRAIT_x", &["GFX_hair:p1"])]);

        let merged = merge(&[a, b]);
        assert_eq!(merged.sprites["GFX_neck"].frame_count, 5);
        assert_eq!(merged.sprites["GFX_neck"].texture_file, "b/GFX_neck.dds");
        assert_eq!(merged.sprites["GFX_hair"].frame_count, 2);
        assert_eq!(merged.portrait_types["PORTRAIT_x"].layers[0].name, "GFX_hair");
    }

    #[test]
    fn test_merge_is_associative_for_overrides() {
        let a = source("a", &[("GFX_neck", 1), ("GFX_ears", 1)], &[]);
        let b = source("b", &[("GFX_neck", 2), ("GFX_nose", 2)], &[]);
        let c = source("c", &[("GFX_nose", 3), ("GFX_ears", 3)], &[]);

        let direct = merge(&[a.clone(), b.clone(), c.clone()]);
        let ab = ContentSource::new("ab", "/content/ab", SourceKind::Directory, merge(&[a, b]));
        let staged = merge(&[ab, c]);
        assert_eq!(direct, staged);
        let again = ContentSource::new("merged", "/content/merged", SourceKind::Directory, direct.clone());
        assert_eq!(direct, merge(&[again]));
    }

    #[test]
    fn test_offsets_applied_after_merge() {
        let mut a = source("a", &[], &[("PORTRAIT_x", &["GFX_neck:d0", "GFX_hair:p1:o1x1"])]);
        a.data.insert_offset("GFX_hair", Offset::new(4, 4));
        let mut b = source("b", &[], &[]);
        b.data.insert_offset("GFX_hair", Offset::new(7, -2));
        b.data.insert_offset("GFX_neck", Offset::new(0, 3));

        let merged = merge(&[a, b]);
        let layers = &merged.portrait_types["PORTRAIT_x"].layers;
        assert_eq!(layers[0].offset, Offset::new(0, 3));
        assert_eq!(layers[1].offset, Offset::new(7, -2));
    }

    #[test]
    fn test_disabled_sources_are_skipped() {
        let a = source("a", &[("GFX_neck", 1)], &[]);
        let mut b = source("b", &[("GFX_neck", 9)], &[]);
        b.disable("test");
        assert_eq!(merge(&[a, b]).sprites["GFX_neck"].frame_count, 1);
    }

    #[test]
    fn test_manager_publishes_new_generations() {
        let manager = ContentManager::new(vec![
            source("vanilla", &[("GFX_neck", 1)], &[("PORTRAIT_x", &["GFX_neck:d0"])]),
            source("dlc", &[("GFX_neck", 4)], &[]),
        ]);
        let first = manager.current();
        assert_eq!(first.id, 0);
        assert_eq!(first.catalog.sprites["GFX_neck"].frame_count, 4);

        assert!(manager.deactivate("dlc"));
        assert!(!manager.deactivate("dlc"));
        let second = manager.current();
        assert_eq!(second.id, 1);
        assert_eq!(second.catalog.sprites["GFX_neck"].frame_count, 1);
        // Earlier snapshots are untouched
        assert_eq!(first.catalog.sprites["GFX_neck"].frame_count, 4);

        assert!(manager.activate("dlc"));
        assert_eq!(manager.current().catalog.sprites["GFX_neck"].frame_count, 4);
        assert!(!manager.activate("missing"));
    }

    #[test]
    fn test_add_source_overrides() {
        let manager = ContentManager::new(vec![source("vanilla", &[("GFX_neck", 1)], &[])]);
        let generation = manager.add_source(source("mod", &[("GFX_neck", 6)], &[]));
        assert_eq!(generation.catalog.sprites["GFX_neck"].frame_count, 6);
        assert_eq!(manager.sources().len(), 2);
    }

    #[test]
    fn test_empty_catalog_lookup() {
        let generation = Generation::build(0, &[]);
        assert_eq!(generation.portrait_type("PORTRAIT_x", None), Err(CatalogError::Empty));
    }
}
