use image::{ColorType, DynamicImage};

/// Pixel-channel layout of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Grayscale,
    GrayscaleAlpha,
    Rgb,
    Rgba,
}

impl PixelMode {
    /// Bits per pixel, matching how the original reported color depth.
    pub fn bit_depth(self) -> u32 {
        match self {
            PixelMode::Grayscale => 8,
            PixelMode::GrayscaleAlpha => 16,
            PixelMode::Rgb => 24,
            PixelMode::Rgba => 32,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, PixelMode::GrayscaleAlpha | PixelMode::Rgba)
    }
}

impl std::fmt::Display for PixelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelMode::Grayscale => "L",
            PixelMode::GrayscaleAlpha => "LA",
            PixelMode::Rgb => "RGB",
            PixelMode::Rgba => "RGBA",
        };
        f.write_str(name)
    }
}

/// An immutable-at-rest pixel image plus format metadata.
///
/// Every transform returns a new `ImageBuffer`; the input is never mutated.
/// Buffers are owned exclusively by whichever history slot or session field
/// holds them, and cross transform boundaries as copies.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    image: DynamicImage,
    /// Source container format ("JPEG", "HEIF", ...), if known.
    format: Option<String>,
    /// EXIF-like key/value pairs carried along from decode.
    metadata: Vec<(String, String)>,
}

impl ImageBuffer {
    pub fn new(image: DynamicImage) -> Self {
        ImageBuffer {
            image,
            format: None,
            metadata: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Vec<(String, String)>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn mode(&self) -> PixelMode {
        match self.image.color() {
            ColorType::L8 | ColorType::L16 => PixelMode::Grayscale,
            ColorType::La8 | ColorType::La16 => PixelMode::GrayscaleAlpha,
            ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => PixelMode::Rgba,
            _ => PixelMode::Rgb,
        }
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// Access to the underlying pixels for rendering or encoding.
    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }

    /// Build a derived buffer: new pixels, same format tag and metadata.
    ///
    /// This is what every transform uses so that EXIF info survives the
    /// edit chain.
    pub fn derive(&self, image: DynamicImage) -> Self {
        ImageBuffer {
            image,
            format: self.format.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

impl From<DynamicImage> for ImageBuffer {
    fn from(image: DynamicImage) -> Self {
        ImageBuffer::new(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_and_depth() {
        let buf = ImageBuffer::new(DynamicImage::new_rgba8(4, 3));
        assert_eq!(buf.mode(), PixelMode::Rgba);
        assert_eq!(buf.mode().bit_depth(), 32);
        assert!(buf.mode().has_alpha());
        assert_eq!(buf.dimensions(), (4, 3));

        let gray = ImageBuffer::new(DynamicImage::new_luma8(2, 2));
        assert_eq!(gray.mode(), PixelMode::Grayscale);
        assert!(!gray.mode().has_alpha());
    }

    #[test]
    fn test_derive_keeps_metadata() {
        let buf = ImageBuffer::new(DynamicImage::new_rgb8(2, 2))
            .with_format("JPEG")
            .with_metadata(vec![("Make".into(), "Apple".into())]);

        let derived = buf.derive(DynamicImage::new_rgb8(1, 1));
        assert_eq!(derived.format(), Some("JPEG"));
        assert_eq!(derived.metadata().len(), 1);
        assert_eq!(derived.dimensions(), (1, 1));
    }
}
