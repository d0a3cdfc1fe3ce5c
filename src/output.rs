//! PNG output and file path generation

use image::imageops::FilterType;
use image::{ImageOutputFormat, RgbaImage};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, OutputError> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageOutputFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Save an RGBA image to a PNG file, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, encode_png(image)?)?;
    Ok(())
}

/// Scale image by integer factor using nearest-neighbor interpolation.
///
/// A factor of 0 or 1 returns the image unchanged.
pub fn scale_image(image: RgbaImage, factor: u8) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    let new_w = w * factor as u32;
    let new_h = h * factor as u32;
    image::imageops::resize(&image, new_w, new_h, FilterType::Nearest)
}

/// Output path for a rendered portrait.
///
/// | `-o` argument | Output |
/// |----------|--------|
/// | none | `{type}_{dna}.png` |
/// | `out.png` | `out.png` |
/// | `dir/` or an existing directory | `dir/{type}_{dna}.png` |
pub fn portrait_output_path(portrait_type: &str, dna: &str, output_arg: Option<&Path>) -> PathBuf {
    let file_name = format!("{}_{}.png", sanitize(portrait_type), sanitize(dna));
    match output_arg {
        None => PathBuf::from(file_name),
        Some(path) if path.to_string_lossy().ends_with('/') || path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
    }
}

/// Replace characters that are awkward in file names (overlay types contain `/`).
fn sanitize(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' }).collect()
}
