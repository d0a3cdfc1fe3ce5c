//! Portrait compositing
//!
//! A render walks the character's layers in order, draws each resolved tile
//! onto a 176×176 canvas and finishes with the government border. Problems
//! with individual layers never abort the render; they are returned as
//! [`RenderIssue`]s next to the best-effort image.

mod blend;
mod steps;

pub use steps::{effective_sprite_name, plan, Placement, RenderStep, Shading};

use image::RgbaImage;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::character::Character;
use crate::characteristic::Characteristic;
use crate::models::PortraitData;
use crate::shader::{shade_eye, shade_hair};
use crate::sprite_cache::{SpriteCache, SpriteError};

/// Width and height of a rendered portrait.
pub const CANVAS_SIZE: u32 = 176;
/// Left and top margin of the working area.
pub const MARGIN: i32 = 12;
/// Height of the working area that layer offsets are measured in.
pub const WORK_AREA: i32 = 152;

/// Why a layer (or the border) is missing from a portrait or drawn differently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderIssue {
    #[error("Layer {layer}: sprite {sprite} is not in the catalog")]
    SpriteNotInCatalog { layer: String, sprite: String },
    /// The government outfit needs a sex the portrait type name does not
    /// give. Unlike the other issues the layer is still drawn, with its own
    /// sprite instead of the outfit.
    #[error("Layer {layer}: cannot tell the sex of {portrait_type} for the government outfit")]
    UnknownSex { layer: String, portrait_type: String },
    #[error("Layer {layer} has no characteristic")]
    NoCharacteristic { layer: String },
    #[error("Layer {layer}: letter not found for {characteristic}")]
    LetterNotFound { layer: String, characteristic: Characteristic },
    #[error("Layer {layer}: {palette} colour palette is empty")]
    EmptyPalette { layer: String, palette: &'static str },
    #[error("Sprite {sprite} has no frames")]
    NoFrames { sprite: String },
    #[error("Layer {layer}: tile {index} of {sprite} is missing")]
    TileMissing { layer: String, sprite: String, index: usize },
    #[error("Layer {layer}: {error}")]
    Sprite { layer: String, error: SpriteError },
    #[error("Border sprite {sprite} is not in the catalog")]
    BorderNotInCatalog { sprite: String },
}

/// A rendered portrait and the problems met on the way.
#[derive(Debug, Clone)]
pub struct Portrait {
    pub image: RgbaImage,
    pub issues: Vec<RenderIssue>,
}

impl Portrait {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Canvas position of a tile's top-left corner.
///
/// Layer offsets are measured from the bottom-left of the working area.
pub fn tile_position(placement: Placement, tile_height: u32) -> (i32, i32) {
    match placement {
        Placement::Origin => (0, 0),
        Placement::Layer(offset) => {
            let height = i32::try_from(tile_height).unwrap_or(i32::MAX);
            (MARGIN + offset.x, MARGIN + WORK_AREA - height - offset.y)
        }
    }
}

/// Render a character with the active catalog and tile cache.
///
/// Fails only when the catalog has no portrait types at all.
pub fn render_portrait(
    character: &Character,
    catalog: &PortraitData,
    cache: &SpriteCache,
) -> Result<Portrait, CatalogError> {
    if catalog.portrait_types.is_empty() {
        return Err(CatalogError::Empty);
    }

    tracing::debug!(character = %character, portrait_type = %character.portrait_type.name, "Rendering portrait");

    let (steps, mut issues) = plan(character, catalog);
    let mut image = RgbaImage::new(CANVAS_SIZE, CANVAS_SIZE);

    for step in &steps {
        if let Err(issue) = draw_step(&mut image, step, cache) {
            tracing::warn!(layer = %step.label, "{}", issue);
            issues.push(issue);
        }
    }

    Ok(Portrait { image, issues })
}

fn draw_step(canvas: &mut RgbaImage, step: &RenderStep, cache: &SpriteCache) -> Result<(), RenderIssue> {
    let tiles = cache
        .get(&step.sprite)
        .map_err(|error| RenderIssue::Sprite { layer: step.label.clone(), error })?;
    let tile = tiles.get(step.tile_index).ok_or_else(|| RenderIssue::TileMissing {
        layer: step.label.clone(),
        sprite: step.sprite.name.clone(),
        index: step.tile_index,
    })?;

    let (x, y) = tile_position(step.placement, tile.height());
    match step.shading {
        Shading::None => blend::blit(canvas, tile, x, y),
        Shading::Hair(hair) => blend::blit(canvas, &shade_hair(tile, hair), x, y),
        Shading::Eye(colour) => blend::blit(canvas, &shade_eye(tile, colour), x, y),
    }
    Ok(())
}
