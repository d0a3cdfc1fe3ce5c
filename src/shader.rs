//! Hair and eye recolouring of sprite tiles
//!
//! Both shaders return a recoloured copy of the tile. Fully transparent
//! pixels are left untouched and every pixel keeps its source alpha.

use image::{Rgba, RgbaImage};

use crate::models::{Colour, Hair};

/// Recolour an eye tile: the source red channel scales a flat eye colour.
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use portrait_builder::models::Colour;
/// use portrait_builder::shader::shade_eye;
///
/// let tile = RgbaImage::from_pixel(1, 1, Rgba([255, 3, 4, 200]));
/// let shaded = shade_eye(&tile, Colour::new(200, 100, 50));
/// assert_eq!(shaded.get_pixel(0, 0), &Rgba([200, 100, 50, 200]));
/// ```
pub fn shade_eye(tile: &RgbaImage, eye: Colour) -> RgbaImage {
    let mut out = tile.clone();
    for pixel in out.pixels_mut() {
        let [red, _, _, alpha] = pixel.0;
        if alpha == 0 {
            continue;
        }
        let scale = |channel: u8| (u16::from(channel) * u16::from(red) / 255) as u8;
        *pixel = Rgba([scale(eye.r), scale(eye.g), scale(eye.b), alpha]);
    }
    out
}

/// Recolour a hair tile: the source green channel walks a three-stop
/// gradient from `dark` through `base` (at 128) to `highlight`.
pub fn shade_hair(tile: &RgbaImage, hair: Hair) -> RgbaImage {
    let mut out = tile.clone();
    for pixel in out.pixels_mut() {
        let [_, green, _, alpha] = pixel.0;
        if alpha == 0 {
            continue;
        }
        let green = i32::from(green);
        let mid = lerp(hair.dark, hair.base, clamp(green * 2));
        let Colour { r, g, b } = lerp(mid, hair.highlight, clamp((green - 128) * 2));
        *pixel = Rgba([r, g, b, alpha]);
    }
    out
}

/// Blend factor in `0.0..=1.0` from a value clamped to the byte range.
fn clamp(value: i32) -> f64 {
    f64::from(value.clamp(0, 255)) / 255.0
}

fn lerp(from: Colour, to: Colour, t: f64) -> Colour {
    let channel = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    Colour::new(channel(from.r, to.r), channel(from.g, to.g), channel(from.b, to.b))
}
