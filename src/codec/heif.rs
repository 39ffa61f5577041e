//! HEIF/HEIC decoding via libheif.
//!
//! Requires the `heif` feature and system libheif:
//!
//! ```text
//! apt install libheif-dev   # Debian/Ubuntu
//! dnf install libheif-devel # Fedora
//! brew install libheif      # macOS
//! ```

use std::path::Path;

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::error::ViewerError;
use crate::imaging::ImageBuffer;

/// Decode the primary image of a HEIF/HEIC container to 8-bit RGB(A).
pub fn decode(path: &Path) -> Result<ImageBuffer, ViewerError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| ViewerError::decode(path, "path is not valid UTF-8"))?;

    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_file(path_str)
        .map_err(|e| ViewerError::decode(path, format!("HEIF read error: {e}")))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| ViewerError::decode(path, format!("HEIF handle error: {e}")))?;

    let has_alpha = handle.has_alpha_channel();
    let color_space = if has_alpha {
        ColorSpace::Rgba(RgbChroma::Rgba)
    } else {
        ColorSpace::Rgb(RgbChroma::Rgb)
    };

    let heif_image = lib
        .decode(&handle, color_space, None)
        .map_err(|e| ViewerError::decode(path, format!("HEIF decode error: {e}")))?;

    let plane = heif_image
        .planes()
        .interleaved
        .ok_or_else(|| ViewerError::decode(path, "no interleaved plane"))?;

    let width = plane.width;
    let height = plane.height;
    let channels = if has_alpha { 4usize } else { 3usize };
    let stride = plane.stride;
    let data = plane.data;

    // The decoder pads rows to `stride`; repack to tight rows.
    let mut pixels = Vec::with_capacity(width as usize * height as usize * channels);
    for y in 0..height as usize {
        let row = &data[y * stride..y * stride + width as usize * channels];
        pixels.extend_from_slice(row);
    }

    let image = if has_alpha {
        RgbaImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| ViewerError::decode(path, "RGBA plane size mismatch"))?
    } else {
        RgbImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| ViewerError::decode(path, "RGB plane size mismatch"))?
    };

    Ok(ImageBuffer::new(image).with_format("HEIF"))
}
