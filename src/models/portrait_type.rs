//! Portrait types: ordered layer recipes plus colour palettes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Layer;
use crate::characteristic::{Characteristic, EYE_COLOR, HAIR_COLOR};

/// An RGB colour from a palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One hair palette entry: three gradient stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hair {
    pub dark: Colour,
    pub base: Colour,
    pub highlight: Colour,
}

/// A portrait recipe for one ethnicity, sex and age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortraitType {
    pub name: String,
    #[serde(default)]
    pub effect_file: String,
    /// DNA position whose letter picks the hair palette entry
    #[serde(default = "default_hair_colour_index")]
    pub hair_colour_index: usize,
    /// DNA position whose letter picks the eye palette entry
    #[serde(default = "default_eye_colour_index")]
    pub eye_colour_index: usize,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub hair_colours: Vec<Hair>,
    #[serde(default)]
    pub eye_colours: Vec<Colour>,
    #[serde(default)]
    pub headgear_that_hides_hair: Vec<i32>,
}

fn default_hair_colour_index() -> usize {
    HAIR_COLOR.index
}

fn default_eye_colour_index() -> usize {
    EYE_COLOR.index
}

impl Default for PortraitType {
    fn default() -> Self {
        Self {
            name: String::new(),
            effect_file: String::new(),
            hair_colour_index: default_hair_colour_index(),
            eye_colour_index: default_eye_colour_index(),
            layers: Vec::new(),
            hair_colours: Vec::new(),
            eye_colours: Vec::new(),
            headgear_that_hides_hair: Vec::new(),
        }
    }
}

impl PortraitType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Base types carry hair colours and can be selected directly. The rest
    /// only exist as clothing overlays for [`PortraitType::merge`].
    pub fn is_base(&self) -> bool {
        !self.hair_colours.is_empty()
    }

    /// First layer bound to the given culture slot.
    pub fn culture_layer(&self, culture_index: u32) -> Option<&Layer> {
        self.layers.iter().find(|l| l.culture_index == Some(culture_index))
    }

    /// Lay an overlay's culture layers over this base type.
    ///
    /// Scalars and palettes come from `self`. A base layer with a culture
    /// index takes the sprite name of the overlay's first layer with the same
    /// index and keeps everything else; other layers are copied unchanged.
    pub fn merge(&self, overlay: &PortraitType) -> PortraitType {
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                let replacement = layer.culture_index.and_then(|c| overlay.culture_layer(c));
                match replacement {
                    Some(over) => Layer { name: over.name.clone(), ..layer.clone() },
                    None => layer.clone(),
                }
            })
            .collect();

        PortraitType {
            name: format!("{}/{}", self.name, overlay.name),
            layers,
            ..self.clone()
        }
    }

    /// Characteristics of layers bound to positions outside the built-in catalog.
    pub fn custom_characteristics(&self) -> BTreeSet<usize> {
        self.layers
            .iter()
            .filter_map(|l| l.characteristic)
            .filter(|c| c.is_custom)
            .map(|c| c.index)
            .collect()
    }

    /// Layers bound to a characteristic, in drawing order.
    pub fn layers_for(&self, characteristic: Characteristic) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(move |l| l.characteristic == Some(characteristic))
    }
}
