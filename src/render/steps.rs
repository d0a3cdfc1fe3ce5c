//! Resolution of a character's layers into drawable steps
//!
//! Resolution only needs the catalog. Each layer either becomes a
//! [`RenderStep`] or a [`RenderIssue`] explaining why it draws nothing.

use crate::character::Character;
use crate::characteristic::{Characteristic, CLOTHES, EYE_COLOR, HAIR_COLOR, HEADGEAR};
use crate::genome::letter_to_index;
use crate::models::{Colour, Hair, Layer, Offset, PortraitData, SpriteDef};

use super::RenderIssue;

/// Recolouring applied to a tile before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    None,
    Hair(Hair),
    Eye(Colour),
}

/// Where a tile is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Bottom-left anchored in the working area, shifted by the layer offset
    Layer(Offset),
    /// Top-left corner of the canvas
    Origin,
}

/// One tile to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStep {
    /// Layer name, or the border sprite name
    pub label: String,
    pub sprite: SpriteDef,
    pub tile_index: usize,
    pub shading: Shading,
    pub placement: Placement,
}

/// Sprite name to draw for a layer, after government outfit overrides.
///
/// Theocracies and merchant republics dress clothes and headgear layers in
/// `GFX_{religious|merchant}_{sex}_{clothes|headgear}[_behind]`. When the
/// sex cannot be inferred the error is [`RenderIssue::UnknownSex`], and
/// [`plan`] keeps drawing the layer's own sprite.
pub fn effective_sprite_name(character: &Character, layer: &Layer) -> Result<String, RenderIssue> {
    let outfit = match layer.characteristic {
        Some(c) if c == CLOTHES => "clothes",
        Some(c) if c == HEADGEAR => "headgear",
        _ => return Ok(layer.name.clone()),
    };
    let Some(government) = character.government.outfit_prefix() else {
        return Ok(layer.name.clone());
    };
    let Some(sex) = character.sex() else {
        return Err(RenderIssue::UnknownSex {
            layer: layer.name.clone(),
            portrait_type: character.portrait_type.name.clone(),
        });
    };

    let behind = if layer.name.contains("behind") { "_behind" } else { "" };
    Ok(format!("GFX_{}_{}_{}{}", government, sex.as_str(), outfit, behind))
}

/// Resolve every layer of the character's portrait type, then the border.
pub fn plan(character: &Character, catalog: &PortraitData) -> (Vec<RenderStep>, Vec<RenderIssue>) {
    let mut steps = Vec::new();
    let mut issues = Vec::new();

    for layer in &character.portrait_type.layers {
        match resolve_layer(character, catalog, layer, &mut issues) {
            Ok(step) => {
                tracing::debug!(layer = %layer.name, sprite = %step.sprite.name, tile = step.tile_index, "Layer resolved");
                steps.push(step);
            }
            Err(issue) => {
                tracing::warn!(layer = %layer.name, "{}", issue);
                issues.push(issue);
            }
        }
    }

    match resolve_border(character, catalog) {
        Ok(step) => steps.push(step),
        Err(issue) => {
            tracing::warn!("{}", issue);
            issues.push(issue);
        }
    }

    (steps, issues)
}

fn resolve_layer(
    character: &Character,
    catalog: &PortraitData,
    layer: &Layer,
    issues: &mut Vec<RenderIssue>,
) -> Result<RenderStep, RenderIssue> {
    // A missing override falls back to the layer's own sprite
    let name = effective_sprite_name(character, layer).unwrap_or_else(|issue| {
        tracing::warn!(layer = %layer.name, "{}", issue);
        issues.push(issue);
        layer.name.clone()
    });
    let sprite = catalog
        .sprites
        .get(&name)
        .or_else(|| catalog.sprites.get(&layer.name))
        .ok_or_else(|| RenderIssue::SpriteNotInCatalog { layer: layer.name.clone(), sprite: name.clone() })?;

    let characteristic =
        layer.characteristic.ok_or_else(|| RenderIssue::NoCharacteristic { layer: layer.name.clone() })?;
    let letter = character
        .letter(characteristic)
        .ok_or_else(|| RenderIssue::LetterNotFound { layer: layer.name.clone(), characteristic })?;
    let tile_index = letter_to_index(letter, sprite.tile_count())
        .ok_or_else(|| RenderIssue::NoFrames { sprite: sprite.name.clone() })?;

    let shading = if layer.is_hair {
        Shading::Hair(palette_entry(character, layer, "hair", &character.portrait_type.hair_colours, HAIR_COLOR)?)
    } else if layer.is_eye {
        Shading::Eye(palette_entry(character, layer, "eye", &character.portrait_type.eye_colours, EYE_COLOR)?)
    } else {
        Shading::None
    };

    Ok(RenderStep {
        label: layer.name.clone(),
        sprite: sprite.clone(),
        tile_index,
        shading,
        placement: Placement::Layer(layer.offset),
    })
}

fn palette_entry<T: Copy>(
    character: &Character,
    layer: &Layer,
    palette: &'static str,
    entries: &[T],
    characteristic: Characteristic,
) -> Result<T, RenderIssue> {
    let letter = character
        .letter(characteristic)
        .ok_or_else(|| RenderIssue::LetterNotFound { layer: layer.name.clone(), characteristic })?;
    letter_to_index(letter, entries.len())
        .and_then(|i| entries.get(i).copied())
        .ok_or_else(|| RenderIssue::EmptyPalette { layer: layer.name.clone(), palette })
}

fn resolve_border(character: &Character, catalog: &PortraitData) -> Result<RenderStep, RenderIssue> {
    let name = character.government.border_sprite();
    let sprite = catalog.sprites.get(&name).ok_or(RenderIssue::BorderNotInCatalog { sprite: name })?;
    Ok(RenderStep {
        label: sprite.name.clone(),
        sprite: sprite.clone(),
        tile_index: character.rank.ordinal(),
        shading: Shading::None,
        placement: Placement::Origin,
    })
}
