/// Batch conversion.
///
/// Converts a list of files to one output format on blocking worker tasks,
/// reporting per-file progress over a channel so the caller can keep a
/// progress bar (or a terminal) updated while the job runs. One bad file
/// fails that file only; the job continues.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::task;

use crate::codec::{self, OutputFormat};
use crate::error::ViewerError;
use crate::imaging::{ops, ImageBuffer};

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// If set, resize every image to (or into) this width x height.
    pub resize: Option<(u32, u32)>,
    /// With `resize`: shrink to fit inside the box keeping aspect ratio
    /// (never enlarging) instead of stretching to the exact size.
    pub preserve_aspect: bool,
}

/// Per-file progress events, most-recent file first in the terminal.
#[derive(Debug, Clone)]
pub enum BatchProgress {
    Converted {
        index: usize,
        total: usize,
        output: PathBuf,
    },
    Failed {
        index: usize,
        total: usize,
        input: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub converted: usize,
    pub failed: usize,
}

/// Run the whole job, emitting one [`BatchProgress`] per input file.
///
/// Decoding and encoding are CPU-bound, so each file runs under
/// `spawn_blocking`; files are processed in order, one at a time, which
/// keeps memory flat no matter how large the batch is.
pub async fn run(job: BatchJob, progress: mpsc::UnboundedSender<BatchProgress>) -> BatchSummary {
    let total = job.files.len();
    let mut summary = BatchSummary::default();

    for (index, input) in job.files.iter().enumerate() {
        let input = input.clone();
        let output = output_path(&job.output_dir, &input, job.format);
        let format = job.format;
        let quality = job.quality;
        let resize = job.resize;
        let preserve_aspect = job.preserve_aspect;

        let worker_input = input.clone();
        let worker_output = output.clone();
        let result = task::spawn_blocking(move || {
            convert_one(
                &worker_input,
                &worker_output,
                format,
                quality,
                resize,
                preserve_aspect,
            )
        })
        .await;

        let event = match result {
            Ok(Ok(())) => {
                summary.converted += 1;
                BatchProgress::Converted {
                    index,
                    total,
                    output,
                }
            }
            Ok(Err(e)) => {
                summary.failed += 1;
                BatchProgress::Failed {
                    index,
                    total,
                    input,
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                summary.failed += 1;
                BatchProgress::Failed {
                    index,
                    total,
                    input,
                    reason: format!("worker task failed: {e}"),
                }
            }
        };
        // Receiver hung up: nobody is watching, but the job still runs.
        let _ = progress.send(event);
    }

    summary
}

/// Blocking conversion of a single file.
fn convert_one(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    quality: u8,
    resize: Option<(u32, u32)>,
    preserve_aspect: bool,
) -> Result<(), ViewerError> {
    let decoded = codec::decode(input)?;
    let resized = match resize {
        Some((w, h)) if preserve_aspect => shrink_to_fit(&decoded, w, h)?,
        Some((w, h)) => ops::resize(&decoded, w, h)?,
        None => decoded,
    };
    codec::encode_to_file(&resized, output, format, quality)
}

/// Same stem, new extension, placed in the output directory.
fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "converted".to_string());
    output_dir.join(format!("{stem}.{}", format.extension()))
}

/// Shrink preserving aspect ratio so the image fits inside `max_w` x
/// `max_h`; never enlarges.
fn shrink_to_fit(buf: &ImageBuffer, max_w: u32, max_h: u32) -> Result<ImageBuffer, ViewerError> {
    if max_w == 0 || max_h == 0 {
        return Err(ViewerError::InvalidParameter(
            "resize bounds must be at least 1x1".into(),
        ));
    }
    let (w, h) = buf.dimensions();
    if w <= max_w && h <= max_h {
        return Ok(buf.clone());
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let new_w = ((w as f64 * scale).round() as u32).max(1);
    let new_h = ((h as f64 * scale).round() as u32).max(1);
    ops::resize(buf, new_w, new_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_pixel(w, h, Rgb([10, 200, 30]));
        DynamicImage::ImageRgb8(img).save(&path).unwrap();
        path
    }

    #[test]
    fn test_output_path() {
        let out = output_path(
            Path::new("/out"),
            Path::new("/in/IMG_0042.heic"),
            OutputFormat::Jpeg,
        );
        assert_eq!(out, Path::new("/out/IMG_0042.jpg"));
    }

    #[test]
    fn test_shrink_to_fit() {
        let buf = ImageBuffer::new(DynamicImage::new_rgb8(400, 200));
        let small = shrink_to_fit(&buf, 100, 100).unwrap();
        assert_eq!(small.dimensions(), (100, 50));

        // Already within bounds: untouched.
        let same = shrink_to_fit(&buf, 800, 800).unwrap();
        assert_eq!(same.dimensions(), (400, 200));

        assert!(shrink_to_fit(&buf, 0, 100).is_err());
    }

    #[tokio::test]
    async fn test_batch_converts_and_reports_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        let good_a = write_png(tmp.path(), "a.png", 8, 8);
        let bad = tmp.path().join("broken.png");
        std::fs::write(&bad, b"not a png").unwrap();
        let good_b = write_png(tmp.path(), "b.png", 8, 8);

        let job = BatchJob {
            files: vec![good_a, bad.clone(), good_b],
            output_dir: out_dir.path().to_path_buf(),
            format: OutputFormat::Jpeg,
            quality: 85,
            resize: None,
            preserve_aspect: true,
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let summary = run(job, tx).await;
        assert_eq!(summary, BatchSummary { converted: 2, failed: 1 });

        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[1],
            BatchProgress::Failed { input, .. } if input == &bad
        ));
        assert!(out_dir.path().join("a.jpg").exists());
        assert!(out_dir.path().join("b.jpg").exists());
    }

    #[tokio::test]
    async fn test_batch_resizes_when_bounded() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "big.png", 64, 32);

        let job = BatchJob {
            files: vec![tmp.path().join("big.png")],
            output_dir: out_dir.path().to_path_buf(),
            format: OutputFormat::Png,
            quality: 90,
            resize: Some((16, 16)),
            preserve_aspect: true,
        };

        let (tx, _rx) = mpsc::unbounded_channel();
        let summary = run(job, tx).await;
        assert_eq!(summary.converted, 1);

        let converted = codec::decode(&out_dir.path().join("big.png")).unwrap();
        assert_eq!(converted.dimensions(), (16, 8));
    }

    #[tokio::test]
    async fn test_batch_exact_resize_stretches() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_png(tmp.path(), "big.png", 64, 32);

        let job = BatchJob {
            files: vec![tmp.path().join("big.png")],
            output_dir: out_dir.path().to_path_buf(),
            format: OutputFormat::Png,
            quality: 90,
            resize: Some((20, 20)),
            preserve_aspect: false,
        };

        let (tx, _rx) = mpsc::unbounded_channel();
        let summary = run(job, tx).await;
        assert_eq!(summary.converted, 1);

        let converted = codec::decode(&out_dir.path().join("big.png")).unwrap();
        assert_eq!(converted.dimensions(), (20, 20));
    }
}
