/// Stateless pure transforms: each takes a buffer and parameters and
/// returns a brand-new buffer. Nothing here touches session state or
/// history; parameter violations are rejected up front.

use image::imageops::FilterType;
use image::DynamicImage;

use super::buffer::ImageBuffer;
use super::filters;
use crate::error::ViewerError;

/// Adjustment scalars are limited to the slider range of the viewer.
pub const ADJUST_MIN: f32 = 0.0;
pub const ADJUST_MAX: f32 = 2.0;

/// Crop to `[left, right) x [top, bottom)` in image coordinates.
///
/// The rectangle is first clamped to the buffer bounds; if the clamped
/// region is degenerate the crop is rejected with `InvalidParameter` and
/// the caller's state stays untouched.
pub fn crop(
    buf: &ImageBuffer,
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
) -> Result<ImageBuffer, ViewerError> {
    let (w, h) = buf.dimensions();
    let left = left.min(w);
    let top = top.min(h);
    let right = right.min(w);
    let bottom = bottom.min(h);

    if right <= left || bottom <= top {
        return Err(ViewerError::InvalidParameter(format!(
            "degenerate crop region {left},{top}..{right},{bottom}"
        )));
    }

    let cropped = buf
        .as_image()
        .crop_imm(left, top, right - left, bottom - top);
    Ok(buf.derive(cropped))
}

/// Rotate 90 degrees counter-clockwise; the canvas expands (dimensions swap).
pub fn rotate_left(buf: &ImageBuffer) -> ImageBuffer {
    buf.derive(buf.as_image().rotate270())
}

/// Rotate 90 degrees clockwise; the canvas expands (dimensions swap).
pub fn rotate_right(buf: &ImageBuffer) -> ImageBuffer {
    buf.derive(buf.as_image().rotate90())
}

/// Mirror along the vertical axis (left/right swap).
pub fn flip_horizontal(buf: &ImageBuffer) -> ImageBuffer {
    buf.derive(buf.as_image().fliph())
}

/// Mirror along the horizontal axis (top/bottom swap).
pub fn flip_vertical(buf: &ImageBuffer) -> ImageBuffer {
    buf.derive(buf.as_image().flipv())
}

/// Resample to exactly `width` x `height` with Lanczos3.
///
/// Aspect ratio is deliberately NOT preserved here; that is caller-side
/// policy (the resize dialog recomputes the live-edited field).
pub fn resize(buf: &ImageBuffer, width: u32, height: u32) -> Result<ImageBuffer, ViewerError> {
    if width == 0 || height == 0 {
        return Err(ViewerError::InvalidParameter(format!(
            "resize dimensions must be positive, got {width}x{height}"
        )));
    }
    let resized = buf
        .as_image()
        .resize_exact(width, height, FilterType::Lanczos3);
    Ok(buf.derive(resized))
}

/// Apply brightness, contrast and sharpness in that fixed order.
///
/// Each factor lives in [0.0, 2.0] with 1.0 as the identity; identity
/// factors are skipped entirely so repeated slider recomputes stay cheap.
/// Semantics follow Pillow's ImageEnhance: blend between a degenerate
/// image (black / mean gray / smoothed) and the input.
pub fn adjust(buf: &ImageBuffer, brightness: f32, contrast: f32, sharpness: f32) -> ImageBuffer {
    let brightness = brightness.clamp(ADJUST_MIN, ADJUST_MAX);
    let contrast = contrast.clamp(ADJUST_MIN, ADJUST_MAX);
    let sharpness = sharpness.clamp(ADJUST_MIN, ADJUST_MAX);

    let mut out = buf.clone();
    if !is_identity(brightness) {
        out = map_colors(&out, |px| px * brightness);
    }
    if !is_identity(contrast) {
        let mean = gray_mean(&out);
        out = map_colors(&out, |px| mean + contrast * (px - mean));
    }
    if !is_identity(sharpness) {
        let smoothed = filters::convolve(&out, &filters::SMOOTH);
        out = blend_colors(&smoothed, &out, sharpness);
    }
    out
}

#[inline]
fn is_identity(factor: f32) -> bool {
    (factor - 1.0).abs() < f32::EPSILON
}

/// Mean of the BT.601 luma across the whole image, rounded the way
/// Pillow rounds it for the contrast degenerate.
fn gray_mean(buf: &ImageBuffer) -> f32 {
    let rgb = buf.as_image().to_rgb8();
    let (w, h) = rgb.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for p in rgb.pixels() {
        sum += 0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64;
    }
    ((sum / (w as f64 * h as f64)) + 0.5).floor() as f32
}

/// Apply `f` to every color channel; alpha is untouched.
fn map_colors<F: Fn(f32) -> f32>(buf: &ImageBuffer, f: F) -> ImageBuffer {
    if buf.mode().has_alpha() {
        let mut img = buf.as_image().to_rgba8();
        for p in img.pixels_mut() {
            for c in 0..3 {
                p[c] = f(p[c] as f32).round().clamp(0.0, 255.0) as u8;
            }
        }
        buf.derive(DynamicImage::ImageRgba8(img))
    } else {
        let mut img = buf.as_image().to_rgb8();
        for p in img.pixels_mut() {
            for c in 0..3 {
                p[c] = f(p[c] as f32).round().clamp(0.0, 255.0) as u8;
            }
        }
        buf.derive(DynamicImage::ImageRgb8(img))
    }
}

/// `degenerate + factor * (image - degenerate)` per color channel.
fn blend_colors(degenerate: &ImageBuffer, original: &ImageBuffer, factor: f32) -> ImageBuffer {
    if original.mode().has_alpha() {
        let base = degenerate.as_image().to_rgba8();
        let mut img = original.as_image().to_rgba8();
        for (p, d) in img.pixels_mut().zip(base.pixels()) {
            for c in 0..3 {
                let v = d[c] as f32 + factor * (p[c] as f32 - d[c] as f32);
                p[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
        original.derive(DynamicImage::ImageRgba8(img))
    } else {
        let base = degenerate.as_image().to_rgb8();
        let mut img = original.as_image().to_rgb8();
        for (p, d) in img.pixels_mut().zip(base.pixels()) {
            for c in 0..3 {
                let v = d[c] as f32 + factor * (p[c] as f32 - d[c] as f32);
                p[c] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
        original.derive(DynamicImage::ImageRgb8(img))
    }
}
