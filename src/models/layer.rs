//! Portrait layers and their colon-delimited declaration syntax.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::characteristic::{self, Characteristic, CharacteristicError};

/// Pixel placement of a layer, origin bottom-left of the working area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// One `:`-separated modifier of a layer declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerModifier {
    /// `d<N>`
    Genome(usize),
    /// `p<N>`
    Trait(usize),
    /// `h` or `x`
    Hair,
    /// `e`
    Eye,
    /// `y`
    DontRefreshIfValid,
    /// `o<X>x<Y>`
    Offset(Offset),
    /// `c<N>`
    Culture(i32),
    /// Anything else; kept for diagnostics only
    Unrecognized(String),
}

/// Error for a layer declaration that cannot be used at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("Empty layer declaration")]
    Empty,
    #[error("Invalid number in modifier '{0}'")]
    InvalidNumber(String),
    #[error("Invalid offset modifier '{0}'")]
    InvalidOffset(String),
    #[error(transparent)]
    Characteristic(#[from] CharacteristicError),
}

impl FromStr for LayerModifier {
    type Err = LayerError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let number = |digits: &str| -> Result<usize, LayerError> {
            digits.parse().map_err(|_| LayerError::InvalidNumber(token.to_string()))
        };

        if let Some(rest) = token.strip_prefix('d') {
            Ok(LayerModifier::Genome(number(rest)?))
        } else if let Some(rest) = token.strip_prefix('p') {
            Ok(LayerModifier::Trait(number(rest)?))
        } else if token == "h" || token == "x" {
            Ok(LayerModifier::Hair)
        } else if token == "e" {
            Ok(LayerModifier::Eye)
        } else if token == "y" {
            Ok(LayerModifier::DontRefreshIfValid)
        } else if let Some(rest) = token.strip_prefix('o') {
            let mut parts = rest.split('x');
            let mut coord = || -> Result<i32, LayerError> {
                parts
                    .next()
                    .and_then(|p| p.trim().parse().ok())
                    .ok_or_else(|| LayerError::InvalidOffset(token.to_string()))
            };
            let x = coord()?;
            let y = coord()?;
            Ok(LayerModifier::Offset(Offset::new(x, y)))
        } else if let Some(rest) = token.strip_prefix('c') {
            rest.parse()
                .map(LayerModifier::Culture)
                .map_err(|_| LayerError::InvalidNumber(token.to_string()))
        } else {
            Ok(LayerModifier::Unrecognized(token.to_string()))
        }
    }
}

/// One drawing instruction of a portrait type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layer {
    /// Sprite sheet key
    pub name: String,
    /// Slot selecting the tile; culture-override layers may have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<Characteristic>,
    #[serde(default)]
    pub is_hair: bool,
    #[serde(default)]
    pub is_eye: bool,
    #[serde(default)]
    pub dont_refresh_if_valid: bool,
    #[serde(default)]
    pub offset: Offset,
    /// Slot replaced by clothing overlays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture_index: Option<u32>,
    /// Modifiers that were not understood
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized: Vec<String>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Whether the layer has neither a characteristic nor a culture index.
    ///
    /// Such layers are legal but can never select a tile on their own.
    pub fn is_unbound(&self) -> bool {
        self.characteristic.is_none() && self.culture_index.is_none()
    }

    fn apply(&mut self, modifier: LayerModifier) -> Result<(), LayerError> {
        match modifier {
            LayerModifier::Genome(i) => self.characteristic = Some(characteristic::genome(i)?),
            LayerModifier::Trait(i) => self.characteristic = Some(characteristic::trait_at(i)),
            LayerModifier::Hair => self.is_hair = true,
            LayerModifier::Eye => self.is_eye = true,
            LayerModifier::DontRefreshIfValid => self.dont_refresh_if_valid = true,
            LayerModifier::Offset(o) => self.offset = o,
            // Negative culture indices mean "no culture slot"
            LayerModifier::Culture(c) => self.culture_index = u32::try_from(c).ok(),
            LayerModifier::Unrecognized(token) => self.unrecognized.push(token),
        }
        Ok(())
    }
}

impl FromStr for Layer {
    type Err = LayerError;

    /// Parse `"<spriteName>[:<modifier>]*"`, quotes already stripped.
    ///
    /// ```
    /// use portrait_builder::models::{Layer, Offset};
    ///
    /// let layer: Layer = "GFX_western_male_hair:p1:h:o2x-3".parse().unwrap();
    /// assert_eq!(layer.name, "GFX_western_male_hair");
    /// assert!(layer.is_hair);
    /// assert_eq!(layer.offset, Offset::new(2, -3));
    /// ```
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let spec = spec.replace('"', "");
        let mut parts = spec.split(':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(LayerError::Empty);
        }

        let mut layer = Layer::new(name);
        for token in parts {
            layer.apply(token.parse()?)?;
        }
        Ok(layer)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(c) = &self.characteristic {
            write!(f, ":{}{}", c.kind.prefix(), c.index)?;
        }
        if self.is_hair {
            write!(f, ":h")?;
        }
        if self.is_eye {
            write!(f, ":e")?;
        }
        if self.dont_refresh_if_valid {
            write!(f, ":y")?;
        }
        if self.offset != Offset::default() {
            write!(f, ":o{}", self.offset)?;
        }
        if let Some(c) = self.culture_index {
            write!(f, ":c{}", c)?;
        }
        Ok(())
    }
}
