//! Data models for the portrait catalog (sprites, layers, portrait types)

mod layer;
mod portrait_data;
mod portrait_type;
mod sprite;

pub use layer::{Layer, LayerError, LayerModifier, Offset};
pub use portrait_data::PortraitData;
pub use portrait_type::{Colour, Hair, PortraitType};
pub use sprite::{normalize_texture_path, SpriteDef};
