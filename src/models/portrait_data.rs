//! The sprite / portrait type / offset catalog of one or more content sources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Offset, PortraitType, SpriteDef};
use crate::catalog::CatalogError;
use crate::characteristic::{Characteristic, EYE_COLOR, HAIR_COLOR};

/// Catalog keyed by name. Ordered maps keep listings and serialized packs
/// reproducible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortraitData {
    #[serde(default)]
    pub sprites: BTreeMap<String, SpriteDef>,
    #[serde(default)]
    pub portrait_types: BTreeMap<String, PortraitType>,
    /// Layer offset corrections keyed by sprite name
    #[serde(default)]
    pub offsets: BTreeMap<String, Offset>,
}

impl PortraitData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty() && self.portrait_types.is_empty() && self.offsets.is_empty()
    }

    /// Add a sprite, replacing an earlier declaration of the same name.
    pub fn insert_sprite(&mut self, sprite: SpriteDef) {
        if let Some(old) = self.sprites.insert(sprite.name.clone(), sprite) {
            tracing::debug!(sprite = %old.name, "Replacing sprite declaration");
        }
    }

    /// Add a portrait type, replacing an earlier declaration of the same name.
    pub fn insert_portrait_type(&mut self, portrait_type: PortraitType) {
        if let Some(old) = self.portrait_types.insert(portrait_type.name.clone(), portrait_type) {
            tracing::debug!(portrait_type = %old.name, "Replacing portrait type declaration");
        }
    }

    /// Add an offset unless the sprite already has one; returns whether it was added.
    pub fn insert_offset(&mut self, sprite: impl Into<String>, offset: Offset) -> bool {
        let sprite = sprite.into();
        if self.offsets.contains_key(&sprite) {
            tracing::debug!(sprite = %sprite, "Ignoring duplicate offset");
            return false;
        }
        self.offsets.insert(sprite, offset);
        true
    }

    /// Overlay another catalog on this one; `other` wins on every key.
    pub fn merge_with(&mut self, other: &PortraitData) {
        for (name, sprite) in &other.sprites {
            self.sprites.insert(name.clone(), sprite.clone());
        }
        for (name, portrait_type) in &other.portrait_types {
            self.portrait_types.insert(name.clone(), portrait_type.clone());
        }
        for (name, offset) in &other.offsets {
            self.offsets.insert(name.clone(), *offset);
        }
    }

    /// Set the offset of every layer whose sprite has a correction.
    pub fn apply_offsets(&mut self) {
        if self.offsets.is_empty() {
            return;
        }
        for portrait_type in self.portrait_types.values_mut() {
            for layer in &mut portrait_type.layers {
                if let Some(offset) = self.offsets.get(&layer.name) {
                    layer.offset = *offset;
                }
            }
        }
    }

    /// Portrait types that can be selected on their own.
    pub fn base_types(&self) -> impl Iterator<Item = &PortraitType> {
        self.portrait_types.values().filter(|t| t.is_base())
    }

    /// Resolve a base portrait type, optionally merged with a clothing overlay.
    pub fn portrait_type(&self, base: &str, overlay: Option<&str>) -> Result<PortraitType, CatalogError> {
        if self.portrait_types.is_empty() {
            return Err(CatalogError::Empty);
        }
        let lookup = |name: &str| {
            self.portrait_types
                .get(name)
                .ok_or_else(|| CatalogError::PortraitTypeNotFound(name.to_string()))
        };

        let base_type = lookup(base)?;
        match overlay {
            Some(name) if name != base => Ok(base_type.merge(lookup(name)?)),
            _ => Ok(base_type.clone()),
        }
    }

    /// Number of values a characteristic can take for a portrait type.
    ///
    /// Colour characteristics count palette entries; the rest count the
    /// frames of the first bound layer whose sprite is known.
    pub fn frame_count(&self, portrait_type: &PortraitType, characteristic: Characteristic) -> Option<usize> {
        if characteristic == HAIR_COLOR {
            return Some(portrait_type.hair_colours.len());
        }
        if characteristic == EYE_COLOR {
            return Some(portrait_type.eye_colours.len());
        }
        portrait_type
            .layers_for(characteristic)
            .find_map(|layer| self.sprites.get(&layer.name))
            .map(SpriteDef::tile_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristic::{CLOTHES, HAIR, NECK};
    use crate::models::{Colour, Hair};

    fn portrait(name: &str, layers: &[&str]) -> PortraitType {
        PortraitType {
            name: name.to_string(),
            layers: layers.iter().map(|l| l.parse().unwrap()).collect(),
            hair_colours: vec![Hair::default(); 2],
            eye_colours: vec![Colour::default(); 3],
            ..Default::default()
        }
    }

    #[test]
    fn test_insert_replaces_within_source() {
        let mut data = PortraitData::new();
        data.insert_sprite(SpriteDef::new("GFX_a", "a.dds", 1));
        data.insert_sprite(SpriteDef::new("GFX_a", "b.dds", 2));
        assert_eq!(data.sprites["GFX_a"].texture_file, "b.dds");
    }

    #[test]
    fn test_first_offset_wins_within_source() {
        let mut data = PortraitData::new();
        assert!(data.insert_offset("GFX_a", Offset::new(1, 1)));
        assert!(!data.insert_offset("GFX_a", Offset::new(2, 2)));
        assert_eq!(data.offsets["GFX_a"], Offset::new(1, 1));
    }

    #[test]
    fn test_merge_with_last_wins() {
        let mut a = PortraitData::new();
        a.insert_sprite(SpriteDef::new("GFX_a", "a.dds", 1));
        a.insert_sprite(SpriteDef::new("GFX_only_a", "x.dds", 1));
        a.insert_offset("GFX_a", Offset::new(1, 1));

        let mut b = PortraitData::new();
        b.insert_sprite(SpriteDef::new("GFX_a", "mod/a.dds", 4));
        b.insert_offset("GFX_a", Offset::new(5, 5));

        a.merge_with(&b);
        assert_eq!(a.sprites["GFX_a"].texture_file, "mod/a.dds");
        assert!(a.sprites.contains_key("GFX_only_a"));
        assert_eq!(a.offsets["GFX_a"], Offset::new(5, 5));
    }

    #[test]
    fn test_apply_offsets_by_layer_name() {
        let mut data = PortraitData::new();
        data.insert_portrait_type(portrait("PORTRAIT_a", &["GFX_neck:d0:o1x1", "GFX_hair:p1:h"]));
        data.insert_offset("GFX_hair", Offset::new(-3, 7));
        data.apply_offsets();

        let layers = &data.portrait_types["PORTRAIT_a"].layers;
        assert_eq!(layers[0].offset, Offset::new(1, 1));
        assert_eq!(layers[1].offset, Offset::new(-3, 7));
    }

    #[test]
    fn test_portrait_type_lookup() {
        let mut data = PortraitData::new();
        assert_eq!(data.portrait_type("PORTRAIT_a", None), Err(CatalogError::Empty));

        data.insert_portrait_type(portrait("PORTRAIT_a", &["GFX_clothes:p3:c0"]));
        let mut overlay = PortraitType::new("PORTRAIT_b");
        overlay.layers.push("GFX_b_clothes:c0".parse().unwrap());
        data.insert_portrait_type(overlay);

        assert_eq!(data.portrait_type("PORTRAIT_a", None).unwrap().name, "PORTRAIT_a");
        let merged = data.portrait_type("PORTRAIT_a", Some("PORTRAIT_b")).unwrap();
        assert_eq!(merged.name, "PORTRAIT_a/PORTRAIT_b");
        assert_eq!(merged.layers[0].name, "GFX_b_clothes");

        assert_eq!(
            data.portrait_type("PORTRAIT_x", None),
            Err(CatalogError::PortraitTypeNotFound("PORTRAIT_x".to_string()))
        );
        assert!(data.portrait_type("PORTRAIT_a", Some("PORTRAIT_x")).is_err());
    }

    #[test]
    fn test_base_types_filter() {
        let mut data = PortraitData::new();
        data.insert_portrait_type(portrait("PORTRAIT_a", &[]));
        data.insert_portrait_type(PortraitType::new("PORTRAIT_overlay"));
        let names: Vec<_> = data.base_types().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["PORTRAIT_a"]);
    }

    #[test]
    fn test_frame_count() {
        let mut data = PortraitData::new();
        data.insert_sprite(SpriteDef::new("GFX_neck", "neck.dds", 6));
        let t = portrait("PORTRAIT_a", &["GFX_missing:d0", "GFX_neck:d0", "GFX_clothes:p3"]);

        assert_eq!(data.frame_count(&t, HAIR_COLOR), Some(2));
        assert_eq!(data.frame_count(&t, EYE_COLOR), Some(3));
        assert_eq!(data.frame_count(&t, NECK), Some(6));
        assert_eq!(data.frame_count(&t, CLOTHES), None);
        assert_eq!(data.frame_count(&t, HAIR), None);
    }
}
