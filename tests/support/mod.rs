//! Synthetic content roots shared by the integration tests
//!
//! Layout of [`write_game`]:
//! - `GFX_test_hair`: 2 frames of 10×8, frame N has green = N * 255 (TGA)
//! - `GFX_test_eyes`: 1 frame of 6×4, red = 255 (DDS)
//! - `GFX_test_missing`: declared, no texture on disk
//! - `GFX_charframe_150`: 6 frames of 176×176, a 2px frame with red = 10 * N,
//!   declared as `.dds` but stored as `.tga`
//! - `PORTRAIT_test_male`: hair layer at 10x20, eye layer positioned by the
//!   offsets file at 40x50, 3 hair sets and 2 eye colours

#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;

use portrait_builder::texture::{encode_dds, encode_tga};

/// DNA selecting hair set 1 (d8 = 'a') and eye colour 0 (d9 = '0')
pub const DNA: &str = "aaaaaaaaa0";
/// Properties selecting hair tile 1 (p1 = 'a')
pub const PROPERTIES: &str = "aaaaaaaaaaa";

pub const HAIR_HIGHLIGHT: Rgba<u8> = Rgba([200, 150, 100, 255]);
pub const HAIR_DARK: Rgba<u8> = Rgba([10, 10, 10, 255]);
pub const EYE_COLOUR: Rgba<u8> = Rgba([200, 100, 50, 255]);

/// Top-left of the hair tile: (12 + 10, 12 + 152 - 8 - 20)
pub const HAIR_AT: (u32, u32) = (22, 136);
/// Top-left of the eye tile: (12 + 40, 12 + 152 - 4 - 50)
pub const EYES_AT: (u32, u32) = (52, 110);

pub const SCRIPT: &str = r#"
# Test portraits
spriteTypes = {
    spriteType = {
        name = "GFX_test_hair"
        texturefile = "gfx\\characters\\test_hair.tga"
        noOfFrames = 2
    }
    spriteType = {
        name = "GFX_test_eyes"
        texturefile = "gfx\\characters\\test_eyes.dds"
        noOfFrames = 1
    }
    spriteType = {
        name = "GFX_test_missing"
        texturefile = "gfx\\characters\\test_missing.dds"
        noOfFrames = 3
    }
    spriteType = {
        name = "GFX_charframe_150"
        texturefile = "gfx\\interface\\charframe_150.dds"
        noOfFrames = 6
    }
    portraitType = {
        name = "PORTRAIT_test_male"
        layer = {
            "GFX_test_missing:d0"
            "GFX_test_hair:p1:h:o10x20"
            "GFX_test_eyes:d6:e"
        }
        hair_color = {
            { 0 0 0 } { 0 0 0 } { 0 0 0 }
            { 10 10 10 } { 90 70 50 } { 200 150 100 }
            { 1 1 1 } { 2 2 2 } { 3 3 3 }
        }
        eye_color = {
            { 200 100 50 } { 1 2 3 }
        }
    }
}
"#;

pub const OFFSETS: &str = "GFX_test_eyes = { x = 40 y = 50 }\n";

/// Sheet of `frames` tiles where `pixel(frame, x, y)` colours every pixel.
pub fn sheet(frames: u32, width: u32, height: u32, pixel: impl Fn(u32, u32, u32) -> Rgba<u8>) -> RgbaImage {
    RgbaImage::from_fn(frames * width, height, |x, y| pixel(x / width, x % width, y))
}

pub fn hair_sheet(green_per_frame: u8) -> RgbaImage {
    sheet(2, 10, 8, |frame, _, _| Rgba([0, frame as u8 * green_per_frame, 0, 255]))
}

pub fn eye_sheet() -> RgbaImage {
    sheet(1, 6, 4, |_, _, _| Rgba([255, 0, 0, 255]))
}

pub fn border_sheet() -> RgbaImage {
    sheet(6, 176, 176, |frame, x, y| {
        if x < 2 || y < 2 || x >= 174 || y >= 174 {
            Rgba([frame as u8 * 10, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

pub fn write(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().expect("fixture path has a parent")).expect("create fixture dir");
    fs::write(path, bytes).expect("write fixture");
}

/// Write a complete game-layout content root.
pub fn write_game(root: &Path) {
    write(&root.join("interface/portraits/test.gfx"), SCRIPT.as_bytes());
    write(&root.join("interface/portrait_offsets/offsets.txt"), OFFSETS.as_bytes());
    write(&root.join("gfx/characters/test_hair.tga"), &encode_tga(&hair_sheet(255)));
    write(&root.join("gfx/characters/test_eyes.dds"), &encode_dds(&eye_sheet()));
    write(&root.join("gfx/interface/charframe_150.tga"), &encode_tga(&border_sheet()));
}

/// Write a modification that only replaces the hair texture (frame 1 green = 0).
pub fn write_hair_mod(root: &Path) {
    write(&root.join("gfx/characters/test_hair.tga"), &encode_tga(&hair_sheet(0)));
}

pub fn pixel(image: &RgbaImage, at: (u32, u32)) -> Rgba<u8> {
    *image.get_pixel(at.0, at.1)
}
