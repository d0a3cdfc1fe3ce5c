//! Memoized sprite sheet tiles
//!
//! The cache maps each [`SpriteDef`] to its sliced tiles. Every key is
//! loaded at most once: concurrent first requests for the same key wait on a
//! shared [`OnceLock`] and all receive the same result, failures included.

use image::RgbaImage;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

use crate::content::{ContentSource, SourceKind};
use crate::models::SpriteDef;
use crate::texture::{alternate_path, FileDecoder, TextureDecoder};

/// Failure to provide tiles for a sprite sheet. Layers using it are not drawable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteError {
    #[error("Sprite {sprite} not found: no active content has {texture}")]
    NotFound { sprite: String, texture: String },
    #[error("Sprite {sprite} could not be decoded: {message}")]
    Decode { sprite: String, message: String },
    #[error("Sprite cache has been disposed")]
    Disposed,
}

/// Tiles of one sprite sheet, indexed by frame.
///
/// Pack sprites may have gaps where a tile file was missing.
#[derive(Debug, Clone, Default)]
pub struct SpriteTiles {
    tiles: Vec<Option<RgbaImage>>,
}

impl SpriteTiles {
    pub fn new(tiles: Vec<Option<RgbaImage>>) -> Self {
        Self { tiles }
    }

    /// Slice a texture into `frame_count` equal-width horizontal tiles.
    ///
    /// Non-positive frame counts give no tiles. Returns `None` when the sheet
    /// is narrower than one pixel per frame.
    pub fn from_sheet(sheet: &RgbaImage, frame_count: i32) -> Option<Self> {
        let count = u32::try_from(frame_count).unwrap_or(0);
        if count == 0 {
            return Some(Self::default());
        }
        let (width, height) = sheet.dimensions();
        let tile_width = width / count;
        if tile_width == 0 {
            return None;
        }
        let tiles = (0..count)
            .map(|i| Some(image::imageops::crop_imm(sheet, i * tile_width, 0, tile_width, height).to_image()))
            .collect();
        Some(Self { tiles })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile at `index`, if in range and present.
    pub fn get(&self, index: usize) -> Option<&RgbaImage> {
        self.tiles.get(index).and_then(Option::as_ref)
    }

    /// Number of tiles actually present.
    pub fn present(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }
}

/// Produces the tiles of a sprite sheet.
pub trait SpriteLoader: Send + Sync {
    fn load(&self, sprite: &SpriteDef) -> Result<SpriteTiles, SpriteError>;
}

/// Loads tiles from the active content, highest priority (last) source first.
///
/// Directory sources provide a texture at the sprite's path, or at the same
/// path in the other container format. Pack sources provide a directory of
/// PNG tiles named after the sprite.
pub struct ContentSpriteLoader {
    roots: Vec<(PathBuf, SourceKind)>,
    decoder: Arc<dyn TextureDecoder>,
}

impl ContentSpriteLoader {
    pub fn new(sources: &[ContentSource]) -> Self {
        Self::with_decoder(sources, Arc::new(FileDecoder))
    }

    pub fn with_decoder(sources: &[ContentSource], decoder: Arc<dyn TextureDecoder>) -> Self {
        let roots = sources.iter().map(|s| (s.path.clone(), s.kind)).collect();
        Self { roots, decoder }
    }

    fn find_texture(&self, sprite: &SpriteDef) -> Option<(PathBuf, SourceKind)> {
        self.roots.iter().rev().find_map(|(root, kind)| match kind {
            SourceKind::Directory => {
                let path = root.join(&sprite.texture_file);
                if path.is_file() {
                    return Some((path, *kind));
                }
                alternate_path(&path).filter(|alt| alt.is_file()).map(|alt| (alt, *kind))
            }
            SourceKind::Pack => {
                let dir = pack_sprite_dir(root, &sprite.name);
                has_png(&dir).then_some((dir, *kind))
            }
        })
    }

    fn load_pack_tiles(&self, sprite: &SpriteDef, dir: &Path) -> SpriteTiles {
        let expected = sprite.tile_count();
        let files: Vec<(usize, PathBuf)> = fs::read_dir(dir)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                let index = path
                    .extension()
                    .filter(|e| e.eq_ignore_ascii_case("png"))
                    .and_then(|_| path.file_stem())
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| stem.parse::<usize>().ok())?;
                (index < expected).then_some((index, path))
            })
            .collect();

        // Sized by the highest tile on disk, never by the declared count alone
        let len = files.iter().map(|(index, _)| index + 1).max().unwrap_or(0);
        let mut tiles = vec![None; len];
        for (index, path) in files {
            match self.decoder.decode(&path) {
                Ok(tile) => tiles[index] = Some(tile),
                Err(e) => tracing::warn!(sprite = %sprite.name, error = %e, "Skipping unreadable pack tile"),
            }
        }

        let result = SpriteTiles::new(tiles);
        if result.present() != expected {
            tracing::warn!(
                sprite = %sprite.name,
                dir = %dir.display(),
                expected,
                found = result.present(),
                "Pack sprite is missing frames"
            );
        }
        result
    }
}

impl SpriteLoader for ContentSpriteLoader {
    fn load(&self, sprite: &SpriteDef) -> Result<SpriteTiles, SpriteError> {
        let Some((path, kind)) = self.find_texture(sprite) else {
            tracing::warn!(sprite = %sprite.name, texture = %sprite.texture_file, "Texture not found in active content");
            return Err(SpriteError::NotFound { sprite: sprite.name.clone(), texture: sprite.texture_file.clone() });
        };

        tracing::debug!(sprite = %sprite.name, path = %path.display(), "Loading sprite");
        match kind {
            SourceKind::Pack => Ok(self.load_pack_tiles(sprite, &path)),
            SourceKind::Directory => {
                let sheet = self.decoder.decode(&path).map_err(|e| {
                    tracing::error!(sprite = %sprite.name, error = %e, "Could not decode texture");
                    SpriteError::Decode { sprite: sprite.name.clone(), message: e.to_string() }
                })?;
                SpriteTiles::from_sheet(&sheet, sprite.frame_count).ok_or_else(|| {
                    tracing::error!(sprite = %sprite.name, frames = sprite.frame_count, "Texture is narrower than its frame count");
                    SpriteError::Decode {
                        sprite: sprite.name.clone(),
                        message: format!("{} frames do not fit a {} pixel wide sheet", sprite.frame_count, sheet.width()),
                    }
                })
            }
        }
    }
}

/// Directory holding a sprite's tiles inside a pack root.
pub fn pack_sprite_dir(root: &Path, sprite_name: &str) -> PathBuf {
    root.join(sprite_name)
}

fn has_png(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .any(|e| e.path().extension().is_some_and(|x| x.eq_ignore_ascii_case("png")))
        })
        .unwrap_or(false)
}

type Entry = Arc<OnceLock<Result<Arc<SpriteTiles>, SpriteError>>>;

/// Single-flight memoized tile cache for one set of active content.
pub struct SpriteCache {
    loader: Box<dyn SpriteLoader>,
    entries: Mutex<HashMap<SpriteDef, Entry>>,
    disposed: AtomicBool,
}

impl SpriteCache {
    pub fn new(loader: impl SpriteLoader + 'static) -> Self {
        Self { loader: Box::new(loader), entries: Mutex::new(HashMap::new()), disposed: AtomicBool::new(false) }
    }

    /// Cache over the textures of the given sources.
    pub fn for_sources(sources: &[ContentSource]) -> Self {
        Self::new(ContentSpriteLoader::new(sources))
    }

    /// Tiles of a sprite sheet, loading them on first request.
    pub fn get(&self, sprite: &SpriteDef) -> Result<Arc<SpriteTiles>, SpriteError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(SpriteError::Disposed);
        }

        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(entries.entry(sprite.clone()).or_default())
        };
        entry.get_or_init(|| self.loader.load(sprite).map(Arc::new)).clone()
    }

    /// Number of sprite sheets requested so far.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every decoded tile. Later requests fail with [`SpriteError::Disposed`].
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(sprites = entries.len(), "Disposing sprite cache");
        entries.clear();
    }
}

impl std::fmt::Debug for SpriteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteCache")
            .field("entries", &self.len())
            .field("disposed", &self.disposed.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PortraitData;
    use crate::texture::{encode_dds, encode_tga};
    use image::Rgba;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn sheet(frames: u32) -> RgbaImage {
        RgbaImage::from_fn(frames * 4, 3, |x, _| Rgba([(x / 4) as u8, 0, 0, 255]))
    }

    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl SpriteLoader for CountingLoader {
        fn load(&self, sprite: &SpriteDef) -> Result<SpriteTiles, SpriteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            if sprite.name == "GFX_missing" {
                return Err(SpriteError::NotFound { sprite: sprite.name.clone(), texture: String::new() });
            }
            Ok(SpriteTiles::from_sheet(&sheet(2), sprite.frame_count).unwrap_or_default())
        }
    }

    /// Counts loads through a counter the test keeps hold of.
    struct SharedCountLoader(Arc<AtomicUsize>);

    impl SpriteLoader for SharedCountLoader {
        fn load(&self, sprite: &SpriteDef) -> Result<SpriteTiles, SpriteError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(SpriteTiles::from_sheet(&sheet(2), sprite.frame_count).unwrap_or_default())
        }
    }

    fn dir_source(root: &Path) -> ContentSource {
        ContentSource::new("test", root, SourceKind::Directory, PortraitData::new())
    }

    #[test]
    fn test_slicing() {
        let tiles = SpriteTiles::from_sheet(&sheet(3), 3).unwrap();
        assert_eq!(tiles.len(), 3);
        for i in 0..3 {
            let tile = tiles.get(i).unwrap();
            assert_eq!(tile.dimensions(), (4, 3));
            assert_eq!(tile.get_pixel(0, 0)[0], i as u8);
        }
        assert!(tiles.get(3).is_none());
    }

    #[test]
    fn test_non_positive_frame_count_is_empty() {
        assert!(SpriteTiles::from_sheet(&sheet(1), 0).unwrap().is_empty());
        assert!(SpriteTiles::from_sheet(&sheet(1), -1).unwrap().is_empty());
    }

    #[test]
    fn test_frame_count_wider_than_sheet() {
        assert!(SpriteTiles::from_sheet(&sheet(1), 5).is_none());
        assert!(SpriteTiles::from_sheet(&sheet(1), 2_000_000_000).is_none());
        assert_eq!(SpriteTiles::from_sheet(&sheet(1), 4).unwrap().len(), 4);
    }

    #[test]
    fn test_oversized_frame_count_is_decode_error() {
        let base = TempDir::new().unwrap();
        fs::write(base.path().join("a.dds"), encode_dds(&sheet(1))).unwrap();
        let cache = SpriteCache::for_sources(&[dir_source(base.path())]);
        let err = cache.get(&SpriteDef::new("GFX_a", "a.dds", 2_000_000_000)).unwrap_err();
        assert!(matches!(err, SpriteError::Decode { .. }));
    }

    #[test]
    fn test_corrupt_dds_dimensions_are_decode_error() {
        let base = TempDir::new().unwrap();
        let mut bytes = encode_dds(&RgbaImage::new(1, 1));
        bytes[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        fs::write(base.path().join("a.dds"), bytes).unwrap();

        let cache = SpriteCache::for_sources(&[dir_source(base.path())]);
        let err = cache.get(&SpriteDef::new("GFX_a", "a.dds", 1)).unwrap_err();
        assert!(matches!(err, SpriteError::Decode { .. }));
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = Arc::new(SpriteCache::new(SharedCountLoader(Arc::clone(&calls))));
        let sprite = SpriteDef::new("GFX_a", "a.dds", 2);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let sprite = sprite.clone();
                thread::spawn(move || cache.get(&sprite).unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        cache.get(&sprite).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_is_memoized() {
        let loader = CountingLoader { calls: AtomicUsize::new(0) };
        let cache = SpriteCache::new(loader);
        let missing = SpriteDef::new("GFX_missing", "m.dds", 1);
        let first = cache.get(&missing).unwrap_err();
        let second = cache.get(&missing).unwrap_err();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_dispose() {
        let cache = SpriteCache::new(CountingLoader { calls: AtomicUsize::new(0) });
        let sprite = SpriteDef::new("GFX_a", "a.dds", 2);
        let tiles = cache.get(&sprite).unwrap();
        cache.dispose();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&sprite).unwrap_err(), SpriteError::Disposed);
        // handed-out tiles stay valid
        assert_eq!(tiles.len(), 2);
    }

    #[test]
    fn test_reverse_search_and_alternate_extension() {
        let base = TempDir::new().unwrap();
        let over = TempDir::new().unwrap();
        fs::create_dir_all(base.path().join("gfx")).unwrap();
        fs::create_dir_all(over.path().join("gfx")).unwrap();
        fs::write(base.path().join("gfx/a.dds"), encode_dds(&sheet(1))).unwrap();
        // override only has the TGA variant
        let mut red = sheet(1);
        red.put_pixel(0, 0, Rgba([9, 9, 9, 255]));
        fs::write(over.path().join("gfx/a.tga"), encode_tga(&red)).unwrap();

        let sources = [dir_source(base.path()), dir_source(over.path())];
        let cache = SpriteCache::for_sources(&sources);
        let tiles = cache.get(&SpriteDef::new("GFX_a", "gfx/a.dds", 1)).unwrap();
        assert_eq!(tiles.get(0).unwrap().get_pixel(0, 0), &Rgba([9, 9, 9, 255]));

        let cache = SpriteCache::for_sources(&sources[..1]);
        let tiles = cache.get(&SpriteDef::new("GFX_a", "gfx/a.dds", 1)).unwrap();
        assert_eq!(tiles.get(0).unwrap().get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_texture_missing_everywhere() {
        let base = TempDir::new().unwrap();
        let cache = SpriteCache::for_sources(&[dir_source(base.path())]);
        let err = cache.get(&SpriteDef::new("GFX_a", "gfx/a.dds", 1)).unwrap_err();
        assert!(matches!(err, SpriteError::NotFound { .. }));
    }

    #[test]
    fn test_corrupt_texture_is_decode_error() {
        let base = TempDir::new().unwrap();
        fs::write(base.path().join("a.dds"), b"DDS garbage").unwrap();
        let cache = SpriteCache::for_sources(&[dir_source(base.path())]);
        let err = cache.get(&SpriteDef::new("GFX_a", "a.dds", 1)).unwrap_err();
        assert!(matches!(err, SpriteError::Decode { .. }));
    }

    #[test]
    fn test_pack_tiles_with_gap() {
        let pack = TempDir::new().unwrap();
        let dir = pack_sprite_dir(pack.path(), "GFX_a");
        fs::create_dir_all(&dir).unwrap();
        sheet(1).save(dir.join("0.png")).unwrap();
        sheet(1).save(dir.join("2.png")).unwrap();
        sheet(1).save(dir.join("7.png")).unwrap();

        let source = ContentSource::new("pack", pack.path(), SourceKind::Pack, PortraitData::new());
        let cache = SpriteCache::for_sources(&[source]);
        let tiles = cache.get(&SpriteDef::new("GFX_a", "gfx/a.dds", 3)).unwrap();
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles.present(), 2);
        assert!(tiles.get(1).is_none());
        assert!(tiles.get(2).is_some());
    }

    #[test]
    fn test_pack_tiles_bounded_by_files_on_disk() {
        let pack = TempDir::new().unwrap();
        let dir = pack_sprite_dir(pack.path(), "GFX_a");
        fs::create_dir_all(&dir).unwrap();
        sheet(1).save(dir.join("0.png")).unwrap();
        sheet(1).save(dir.join("1.png")).unwrap();

        let source = ContentSource::new("pack", pack.path(), SourceKind::Pack, PortraitData::new());
        let cache = SpriteCache::for_sources(&[source]);
        let tiles = cache.get(&SpriteDef::new("GFX_a", "gfx/a.dds", 2_000_000_000)).unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles.present(), 2);
    }
}
