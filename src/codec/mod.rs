//! File decoding and encoding.
//!
//! HEIC/HEIF decoding goes through libheif and is gated behind the `heif`
//! feature; everything else is handled by the `image` crate. Decoded
//! buffers carry their EXIF fields so the edit chain can keep showing them.

#[cfg(feature = "heif")]
pub mod heif;
pub mod metadata;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::ViewerError;
use crate::imaging::ImageBuffer;

/// Extensions the viewer will open, lowercase without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "heic", "heif", "jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif",
];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

fn is_heif(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("heic") | Some("heif")
    )
}

/// Decode a file into an [`ImageBuffer`] with its EXIF attached.
pub fn decode(path: &Path) -> Result<ImageBuffer, ViewerError> {
    let buffer = decode_pixels(path)?;
    Ok(buffer.with_metadata(metadata::read_exif(path)))
}

fn decode_pixels(path: &Path) -> Result<ImageBuffer, ViewerError> {
    if is_heif(path) {
        #[cfg(feature = "heif")]
        {
            return heif::decode(path);
        }
        #[cfg(not(feature = "heif"))]
        {
            return Err(ViewerError::decode(
                path,
                "HEIC support is not compiled in (rebuild with --features heif)",
            ));
        }
    }

    let format = ImageFormat::from_path(path)
        .map_err(|e| ViewerError::decode(path, e.to_string()))?;
    let image = image::open(path).map_err(|e| ViewerError::decode(path, e.to_string()))?;
    Ok(ImageBuffer::new(image).with_format(format_name(format)))
}

fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Gif => "GIF",
        ImageFormat::Bmp => "BMP",
        ImageFormat::WebP => "WebP",
        ImageFormat::Tiff => "TIFF",
        _ => "image",
    }
}

/// Formats the viewer can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Tiff,
    Gif,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            "bmp" => Some(OutputFormat::Bmp),
            "tiff" | "tif" => Some(OutputFormat::Tiff),
            "gif" => Some(OutputFormat::Gif),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Gif => "gif",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
            OutputFormat::Bmp => ImageFormat::Bmp,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Gif => ImageFormat::Gif,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Bmp => "BMP",
            OutputFormat::Tiff => "TIFF",
            OutputFormat::Gif => "GIF",
        };
        f.write_str(name)
    }
}

/// Write `buffer` to `path` in `format`. `quality` (1-100) applies to JPEG
/// only; other formats in this set are lossless.
pub fn encode_to_file(
    buffer: &ImageBuffer,
    path: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<(), ViewerError> {
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha; composite onto white like a print preview.
            let flat = flatten_to_white(buffer.as_image());
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            flat.write_with_encoder(encoder)
                .map_err(|e| ViewerError::Encode(e.to_string()))?;
        }
        _ => {
            buffer
                .as_image()
                .save_with_format(path, format.image_format())
                .map_err(|e| ViewerError::Encode(e.to_string()))?;
        }
    }
    Ok(())
}

/// Drop alpha by compositing over a white background.
fn flatten_to_white(image: &DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image.clone();
    }
    let rgba = image.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut flat = RgbImage::new(w, h);
    for (src, dst) in rgba.pixels().zip(flat.pixels_mut()) {
        let a = src[3] as u32;
        let mut out = [0u8; 3];
        for c in 0..3 {
            out[c] = ((src[c] as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        }
        *dst = Rgb(out);
    }
    DynamicImage::ImageRgb8(flat)
}
