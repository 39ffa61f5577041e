/// Fixed image filters.
///
/// The convolution kernels are the classic Pillow built-ins (BLUR, SHARPEN,
/// CONTOUR, DETAIL, EMBOSS, EDGE_ENHANCE, SMOOTH) with their original
/// scale/offset constants, so filtered output matches what users of the
/// original viewer expect. Grayscale and sepia are palette transforms.

use std::str::FromStr;

use image::DynamicImage;

use super::buffer::ImageBuffer;

/// The selectable filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    None,
    Blur,
    Sharpen,
    Contour,
    Detail,
    Emboss,
    EdgeEnhance,
    Smooth,
    Grayscale,
    Sepia,
}

impl FilterKind {
    pub const ALL: [FilterKind; 10] = [
        FilterKind::None,
        FilterKind::Blur,
        FilterKind::Sharpen,
        FilterKind::Contour,
        FilterKind::Detail,
        FilterKind::Emboss,
        FilterKind::EdgeEnhance,
        FilterKind::Smooth,
        FilterKind::Grayscale,
        FilterKind::Sepia,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::None => "None",
            FilterKind::Blur => "Blur",
            FilterKind::Sharpen => "Sharpen",
            FilterKind::Contour => "Contour",
            FilterKind::Detail => "Detail",
            FilterKind::Emboss => "Emboss",
            FilterKind::EdgeEnhance => "Edge Enhance",
            FilterKind::Smooth => "Smooth",
            FilterKind::Grayscale => "Grayscale",
            FilterKind::Sepia => "Sepia",
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FilterKind::None),
            "blur" => Ok(FilterKind::Blur),
            "sharpen" => Ok(FilterKind::Sharpen),
            "contour" => Ok(FilterKind::Contour),
            "detail" => Ok(FilterKind::Detail),
            "emboss" => Ok(FilterKind::Emboss),
            "edge-enhance" | "edge_enhance" | "edgeenhance" => Ok(FilterKind::EdgeEnhance),
            "smooth" => Ok(FilterKind::Smooth),
            "grayscale" | "greyscale" => Ok(FilterKind::Grayscale),
            "sepia" => Ok(FilterKind::Sepia),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// A fixed convolution kernel with Pillow's scale/offset convention:
/// `out = clamp(offset + weighted_sum / scale)`.
pub(crate) struct Kernel {
    size: usize,
    weights: &'static [i32],
    scale: i32,
    offset: i32,
}

const BLUR: Kernel = Kernel {
    size: 5,
    weights: &[
        1, 1, 1, 1, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 0, 0, 0, 1,
        1, 1, 1, 1, 1,
    ],
    scale: 16,
    offset: 0,
};

const SHARPEN: Kernel = Kernel {
    size: 3,
    weights: &[-2, -2, -2, -2, 32, -2, -2, -2, -2],
    scale: 16,
    offset: 0,
};

const CONTOUR: Kernel = Kernel {
    size: 3,
    weights: &[-1, -1, -1, -1, 8, -1, -1, -1, -1],
    scale: 1,
    offset: 255,
};

const DETAIL: Kernel = Kernel {
    size: 3,
    weights: &[0, -1, 0, -1, 10, -1, 0, -1, 0],
    scale: 6,
    offset: 0,
};

const EMBOSS: Kernel = Kernel {
    size: 3,
    weights: &[-1, 0, 0, 0, 1, 0, 0, 0, 0],
    scale: 1,
    offset: 128,
};

const EDGE_ENHANCE: Kernel = Kernel {
    size: 3,
    weights: &[-1, -1, -1, -1, 10, -1, -1, -1, -1],
    scale: 2,
    offset: 0,
};

pub(crate) const SMOOTH: Kernel = Kernel {
    size: 3,
    weights: &[1, 1, 1, 1, 5, 1, 1, 1, 1],
    scale: 13,
    offset: 0,
};

/// Apply a filter, returning a new buffer. `FilterKind::None` is the
/// identity and returns a plain copy.
pub fn apply(buf: &ImageBuffer, kind: FilterKind) -> ImageBuffer {
    match kind {
        FilterKind::None => buf.clone(),
        FilterKind::Blur => convolve(buf, &BLUR),
        FilterKind::Sharpen => convolve(buf, &SHARPEN),
        FilterKind::Contour => convolve(buf, &CONTOUR),
        FilterKind::Detail => convolve(buf, &DETAIL),
        FilterKind::Emboss => convolve(buf, &EMBOSS),
        FilterKind::EdgeEnhance => convolve(buf, &EDGE_ENHANCE),
        FilterKind::Smooth => convolve(buf, &SMOOTH),
        FilterKind::Grayscale => grayscale(buf),
        FilterKind::Sepia => sepia(buf),
    }
}

/// BT.601 luma, the same weighting Pillow uses for mode "L".
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let l = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    l.round().clamp(0.0, 255.0) as u8
}

/// Desaturate to a single-channel image.
fn grayscale(buf: &ImageBuffer) -> ImageBuffer {
    let rgb = buf.as_image().to_rgb8();
    let (w, h) = rgb.dimensions();
    let gray = image::GrayImage::from_fn(w, h, |x, y| {
        let p = rgb.get_pixel(x, y);
        image::Luma([luma(p[0], p[1], p[2])])
    });
    buf.derive(DynamicImage::ImageLuma8(gray))
}

/// Sepia tint for a fully lit pixel.
const SEPIA_TONE: [u32; 3] = [239, 224, 185];

/// Desaturate, then ramp the luma through a fixed warm duotone.
fn sepia(buf: &ImageBuffer) -> ImageBuffer {
    let rgb = buf.as_image().to_rgb8();
    let (w, h) = rgb.dimensions();
    let toned = image::RgbImage::from_fn(w, h, |x, y| {
        let p = rgb.get_pixel(x, y);
        let l = luma(p[0], p[1], p[2]) as u32;
        image::Rgb([
            (SEPIA_TONE[0] * l / 255) as u8,
            (SEPIA_TONE[1] * l / 255) as u8,
            (SEPIA_TONE[2] * l / 255) as u8,
        ])
    });
    buf.derive(DynamicImage::ImageRgb8(toned))
}

/// Run a kernel over the color channels. Alpha passes through unchanged and
/// out-of-bounds samples clamp to the nearest edge pixel.
pub(crate) fn convolve(buf: &ImageBuffer, kernel: &Kernel) -> ImageBuffer {
    if buf.mode().has_alpha() {
        let src = buf.as_image().to_rgba8();
        let (w, h) = src.dimensions();
        let out = convolve_plane(src.as_raw(), w, h, 4, 3, kernel);
        let img = image::RgbaImage::from_raw(w, h, out)
            .unwrap_or_else(|| src.clone());
        buf.derive(DynamicImage::ImageRgba8(img))
    } else {
        let src = buf.as_image().to_rgb8();
        let (w, h) = src.dimensions();
        let out = convolve_plane(src.as_raw(), w, h, 3, 3, kernel);
        let img = image::RgbImage::from_raw(w, h, out)
            .unwrap_or_else(|| src.clone());
        buf.derive(DynamicImage::ImageRgb8(img))
    }
}

fn convolve_plane(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    filtered: usize,
    kernel: &Kernel,
) -> Vec<u8> {
    let w = width as i64;
    let h = height as i64;
    let half = (kernel.size / 2) as i64;
    let mut out = vec![0u8; src.len()];

    for y in 0..h {
        for x in 0..w {
            let base = ((y * w + x) as usize) * channels;
            for c in 0..channels {
                if c >= filtered {
                    out[base + c] = src[base + c];
                    continue;
                }
                let mut acc: i64 = 0;
                for (i, &weight) in kernel.weights.iter().enumerate() {
                    let ky = (i / kernel.size) as i64 - half;
                    let kx = (i % kernel.size) as i64 - half;
                    let sy = (y + ky).clamp(0, h - 1);
                    let sx = (x + kx).clamp(0, w - 1);
                    let sample = src[((sy * w + sx) as usize) * channels + c];
                    acc += weight as i64 * sample as i64;
                }
                let value = kernel.offset as f32 + acc as f32 / kernel.scale as f32;
                out[base + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_rgb(w: u32, h: u32, color: [u8; 3]) -> ImageBuffer {
        let img = image::RgbImage::from_pixel(w, h, image::Rgb(color));
        ImageBuffer::new(DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("blur".parse::<FilterKind>().unwrap(), FilterKind::Blur);
        assert_eq!(
            "edge-enhance".parse::<FilterKind>().unwrap(),
            FilterKind::EdgeEnhance
        );
        assert_eq!("Sepia".parse::<FilterKind>().unwrap(), FilterKind::Sepia);
        assert!("posterize".parse::<FilterKind>().is_err());
    }

    #[test]
    fn test_none_is_identity() {
        let buf = flat_rgb(4, 4, [10, 20, 30]);
        let out = apply(&buf, FilterKind::None);
        assert_eq!(out.as_image().to_rgb8(), buf.as_image().to_rgb8());
    }

    #[test]
    fn test_smooth_preserves_flat_color() {
        // A normalized averaging kernel leaves a constant image unchanged.
        let buf = flat_rgb(6, 6, [120, 90, 60]);
        let out = apply(&buf, FilterKind::Smooth);
        assert_eq!(out.as_image().to_rgb8(), buf.as_image().to_rgb8());
    }

    #[test]
    fn test_contour_flat_is_white() {
        // Zero gradient everywhere: weighted sum is 0, offset 255 wins.
        let buf = flat_rgb(5, 5, [33, 33, 33]);
        let out = apply(&buf, FilterKind::Contour);
        let px = out.as_image().to_rgb8();
        assert_eq!(px.get_pixel(2, 2).0, [255, 255, 255]);
    }

    #[test]
    fn test_grayscale_mode_and_luma() {
        let buf = flat_rgb(3, 3, [255, 0, 0]);
        let out = apply(&buf, FilterKind::Grayscale);
        assert_eq!(out.mode(), crate::imaging::PixelMode::Grayscale);
        let px = out.as_image().to_luma8();
        // 0.299 * 255 = 76.245 -> 76
        assert_eq!(px.get_pixel(1, 1).0, [76]);
    }

    #[test]
    fn test_sepia_white_maps_to_tone() {
        let buf = flat_rgb(2, 2, [255, 255, 255]);
        let out = apply(&buf, FilterKind::Sepia);
        let px = out.as_image().to_rgb8();
        assert_eq!(px.get_pixel(0, 0).0, [239, 224, 185]);
    }

    #[test]
    fn test_filter_keeps_dimensions() {
        let buf = flat_rgb(7, 5, [1, 2, 3]);
        for kind in FilterKind::ALL {
            let out = apply(&buf, kind);
            assert_eq!(out.dimensions(), (7, 5), "{kind} changed dimensions");
        }
    }

    #[test]
    fn test_alpha_passes_through() {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([50, 60, 70, 130]));
        let buf = ImageBuffer::new(DynamicImage::ImageRgba8(img));
        let out = apply(&buf, FilterKind::Blur);
        let px = out.as_image().to_rgba8();
        assert_eq!(px.get_pixel(2, 2).0[3], 130);
    }
}
