//! Texture decoding for sprite sheets
//!
//! Game textures come in two interchangeable containers, DDS and TGA. Only
//! uncompressed 32-bit RGBA layouts are accepted; anything else is a typed
//! error so the sprite sheet is treated as undrawable. Pack tiles are PNG.

use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error decoding a texture file.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is compressed ({format}); only uncompressed RGBA textures are supported", .path.display())]
    Compressed { path: PathBuf, format: String },
    #[error("{} has an unsupported layout: {reason}", .path.display())]
    Unsupported { path: PathBuf, reason: String },
    #[error("Failed to decode {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decode an image file into an RGBA pixel buffer.
pub trait TextureDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<RgbaImage, TextureError>;
}

/// Decoder for `.dds`, `.tga` and `.png` files, dispatched on extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDecoder;

impl TextureDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<RgbaImage, TextureError> {
        let bytes = fs::read(path).map_err(|source| TextureError::Io { path: path.to_path_buf(), source })?;
        match extension(path).as_deref() {
            Some("dds") => decode_dds(&bytes, path),
            Some("tga") => decode_tga(&bytes, path),
            Some("png") => image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                .map(|img| img.to_rgba8())
                .map_err(|source| TextureError::Image { path: path.to_path_buf(), source }),
            other => Err(TextureError::Unsupported {
                path: path.to_path_buf(),
                reason: format!("unknown extension {:?}", other.unwrap_or("")),
            }),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase)
}

/// The same texture path in the other container format, if any.
///
/// ```
/// use portrait_builder::texture::alternate_path;
/// use std::path::Path;
///
/// assert_eq!(alternate_path(Path::new("gfx/a.dds")).unwrap(), Path::new("gfx/a.tga"));
/// assert_eq!(alternate_path(Path::new("gfx/a.TGA")).unwrap(), Path::new("gfx/a.dds"));
/// assert!(alternate_path(Path::new("gfx/a.png")).is_none());
/// ```
pub fn alternate_path(path: &Path) -> Option<PathBuf> {
    match extension(path).as_deref() {
        Some("dds") => Some(path.with_extension("tga")),
        Some("tga") => Some(path.with_extension("dds")),
        _ => None,
    }
}

const TGA_UNCOMPRESSED_TRUE_COLOR: u8 = 2;

fn decode_tga(bytes: &[u8], path: &Path) -> Result<RgbaImage, TextureError> {
    let unsupported = |reason: String| TextureError::Unsupported { path: path.to_path_buf(), reason };

    if bytes.len() < 18 {
        return Err(unsupported("truncated TGA header".to_string()));
    }
    let image_type = bytes[2];
    let depth = bytes[16];
    match image_type {
        TGA_UNCOMPRESSED_TRUE_COLOR => {}
        9..=11 => {
            return Err(TextureError::Compressed { path: path.to_path_buf(), format: "TGA RLE".to_string() });
        }
        other => return Err(unsupported(format!("TGA image type {}", other))),
    }
    if depth != 32 {
        return Err(unsupported(format!("{}-bit TGA, expected 32-bit RGBA", depth)));
    }

    image::load_from_memory_with_format(bytes, ImageFormat::Tga)
        .map(|img| img.to_rgba8())
        .map_err(|source| TextureError::Image { path: path.to_path_buf(), source })
}

const DDS_MAGIC: &[u8; 4] = b"DDS ";
const DDS_HEADER_END: usize = 128;
const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDSD_PITCH: u32 = 0x8;

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

/// One channel described by a DDS bit mask.
struct Channel {
    mask: u32,
    shift: u32,
    max: u32,
}

impl Channel {
    fn new(mask: u32) -> Self {
        let shift = if mask == 0 { 0 } else { mask.trailing_zeros() };
        Self { mask, shift, max: mask.checked_shr(shift).unwrap_or(0) }
    }

    fn extract(&self, pixel: u32) -> u8 {
        if self.max == 0 {
            return 0;
        }
        let value = (pixel & self.mask) >> self.shift;
        if self.max == 255 {
            value as u8
        } else {
            ((u64::from(value) * 255 + u64::from(self.max) / 2) / u64::from(self.max)) as u8
        }
    }
}

fn decode_dds(bytes: &[u8], path: &Path) -> Result<RgbaImage, TextureError> {
    let unsupported = |reason: &str| TextureError::Unsupported { path: path.to_path_buf(), reason: reason.to_string() };

    if bytes.len() < DDS_HEADER_END || &bytes[0..4] != DDS_MAGIC || read_u32(bytes, 4) != 124 {
        return Err(unsupported("not a DDS file"));
    }

    let flags = read_u32(bytes, 8);
    let height = read_u32(bytes, 12);
    let width = read_u32(bytes, 16);
    let pitch = read_u32(bytes, 20);
    let pf_flags = read_u32(bytes, 80);

    if pf_flags & DDPF_FOURCC != 0 {
        let fourcc = String::from_utf8_lossy(&bytes[84..88]).into_owned();
        return Err(TextureError::Compressed { path: path.to_path_buf(), format: fourcc });
    }
    if pf_flags & DDPF_RGB == 0 || pf_flags & DDPF_ALPHAPIXELS == 0 || read_u32(bytes, 88) != 32 {
        return Err(unsupported("expected 32-bit RGBA pixels"));
    }

    let channels = [
        Channel::new(read_u32(bytes, 92)),
        Channel::new(read_u32(bytes, 96)),
        Channel::new(read_u32(bytes, 100)),
        Channel::new(read_u32(bytes, 104)),
    ];

    if width == 0 || height == 0 {
        return Err(unsupported("empty image"));
    }
    let Some(row_bytes) = (width as usize).checked_mul(4) else {
        return Err(unsupported("image dimensions overflow"));
    };
    let stride = if flags & DDSD_PITCH != 0 && pitch as usize >= row_bytes { pitch as usize } else { row_bytes };
    let needed = stride
        .checked_mul((height - 1) as usize)
        .and_then(|n| n.checked_add(row_bytes))
        .and_then(|n| n.checked_add(DDS_HEADER_END));
    match needed {
        Some(needed) if needed <= bytes.len() => {}
        _ => return Err(unsupported("truncated pixel data")),
    }

    let mut image = RgbaImage::new(width, height);
    for y in 0..height {
        let row = DDS_HEADER_END + y as usize * stride;
        for x in 0..width {
            let pixel = read_u32(bytes, row + x as usize * 4);
            let rgba = [
                channels[0].extract(pixel),
                channels[1].extract(pixel),
                channels[2].extract(pixel),
                channels[3].extract(pixel),
            ];
            image.put_pixel(x, y, image::Rgba(rgba));
        }
    }
    Ok(image)
}

/// Encode an uncompressed 32-bit BGRA DDS file.
///
/// Used to produce fixtures and extracted textures.
pub fn encode_dds(image: &RgbaImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    // DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PITCH | DDSD_PIXELFORMAT
    let header: [u32; 31] = [
        124, 0x1 | 0x2 | 0x4 | DDSD_PITCH | 0x1000, height, width, width * 4, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        32, DDPF_RGB | DDPF_ALPHAPIXELS, 0, 32, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000,
        0x1000, 0, 0, 0, 0,
    ];

    let mut out = Vec::with_capacity(DDS_HEADER_END + (width * height * 4) as usize);
    out.extend_from_slice(DDS_MAGIC);
    for value in header {
        out.extend_from_slice(&value.to_le_bytes());
    }
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        out.extend_from_slice(&[b, g, r, a]);
    }
    out
}

/// Encode an uncompressed 32-bit TGA file with a top-left origin.
pub fn encode_tga(image: &RgbaImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut out = Vec::with_capacity(18 + (width * height * 4) as usize);
    out.extend_from_slice(&[0, 0, TGA_UNCOMPRESSED_TRUE_COLOR, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    out.extend_from_slice(&(width as u16).to_le_bytes());
    out.extend_from_slice(&(height as u16).to_le_bytes());
    // 8 alpha bits, top-left origin
    out.extend_from_slice(&[32, 0x28]);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        out.extend_from_slice(&[b, g, r, a]);
    }
    out
}
