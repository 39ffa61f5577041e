/// The edit session: one open image, its pending adjustments, undo/redo
/// history and viewport, driven through a single `dispatch` entry point.
///
/// Buffers form a chain: `original` (as decoded) -> `baseline` (after all
/// committed edits) -> `adjusted` (baseline with the brightness/contrast/
/// sharpness scalars applied). Committed edits push the pre-edit baseline
/// to history; scalar changes are transient and only recompute `adjusted`.

use std::path::{Path, PathBuf};

use crate::codec;
use crate::codec::metadata::format_file_size;
use crate::error::ViewerError;
use crate::imaging::{filters, ops, FilterKind, ImageBuffer};
use crate::state::history::EditHistory;
use crate::state::viewport::ViewportState;

/// Minimum drag extent, in device pixels per axis, for a crop drag to
/// count as a selection rather than a stray click.
pub const CROP_DRAG_THRESHOLD: f64 = 10.0;

/// Transient per-image adjustment scalars, 1.0 = unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustments {
    pub brightness: f32,
    pub contrast: f32,
    pub sharpness: f32,
}

impl Default for Adjustments {
    fn default() -> Self {
        Adjustments {
            brightness: 1.0,
            contrast: 1.0,
            sharpness: 1.0,
        }
    }
}

impl Adjustments {
    pub fn is_identity(&self) -> bool {
        let id = |v: f32| (v - 1.0).abs() < f32::EPSILON;
        id(self.brightness) && id(self.contrast) && id(self.sharpness)
    }
}

/// Crop interaction sub-state. Coordinates are device (canvas) pixels;
/// conversion to image space happens only when the drag is accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropState {
    Inactive,
    /// Crop mode is on, waiting for the pointer to go down.
    Armed,
    Dragging {
        anchor: (f64, f64),
    },
}

#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    /// As decoded, untouched. `Reset` returns to this.
    pub original: ImageBuffer,
    /// After all committed edits.
    pub baseline: ImageBuffer,
    /// Baseline with the adjustment scalars applied; what gets rendered
    /// and saved.
    pub adjusted: ImageBuffer,
    /// Net rotation in degrees, shown in the info line. Informational
    /// only; it is not rewound by undo.
    pub rotation_angle: u16,
    pub file_size: u64,
}

/// Commands accepted by [`EditSession::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditCommand {
    RotateLeft,
    RotateRight,
    FlipHorizontal,
    FlipVertical,
    Crop {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
    Resize {
        width: u32,
        height: u32,
    },
    Filter(FilterKind),
    SetBrightness(f32),
    SetContrast(f32),
    SetSharpness(f32),
    Reset,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ActualSize,
    FitToWindow,
    FillToWindow,
}

/// Whether a command rewrites the committed edit chain (and therefore
/// pushes history before applying) or only touches transient state
/// (sliders, history cursor, zoom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Committable,
    Transient,
}

impl EditCommand {
    pub fn mutation(self) -> Mutation {
        use EditCommand::*;
        match self {
            RotateLeft | RotateRight | FlipHorizontal | FlipVertical | Crop { .. }
            | Resize { .. } | Filter(_) | Reset => Mutation::Committable,
            SetBrightness(_) | SetContrast(_) | SetSharpness(_) | Undo | Redo | ZoomIn
            | ZoomOut | ActualSize | FitToWindow | FillToWindow => Mutation::Transient,
        }
    }
}

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied { status: String },
    /// Legal but meaningless here (no image, empty history, identity
    /// filter); state is unchanged.
    Ignored,
}

impl Outcome {
    fn applied(status: impl Into<String>) -> Self {
        Outcome::Applied {
            status: status.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EditSession {
    image: Option<LoadedImage>,
    adjustments: Adjustments,
    history: EditHistory,
    viewport: ViewportState,
    crop: CropState,
}

impl Default for CropState {
    fn default() -> Self {
        CropState::Inactive
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    pub fn crop_state(&self) -> CropState {
        self.crop
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The buffer to render or export, if an image is open.
    pub fn current(&self) -> Option<&ImageBuffer> {
        self.image.as_ref().map(|img| &img.adjusted)
    }

    /// Open a file, replacing any previous image.
    ///
    /// Decode happens before the session is touched: on failure the
    /// previous image, history and viewport survive intact.
    pub fn open(&mut self, path: &Path) -> Result<(), ViewerError> {
        let decoded = codec::decode(path)?;
        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let (w, h) = decoded.dimensions();
        self.image = Some(LoadedImage {
            path: path.to_path_buf(),
            original: decoded.clone(),
            baseline: decoded.clone(),
            adjusted: decoded,
            rotation_angle: 0,
            file_size,
        });
        self.adjustments = Adjustments::default();
        self.history.clear();
        self.crop = CropState::Inactive;
        self.viewport.reset();
        self.viewport.fill_to_window(w, h);
        Ok(())
    }

    pub fn dispatch(&mut self, cmd: EditCommand) -> Result<Outcome, ViewerError> {
        use EditCommand::*;

        // View commands first; only the fit family needs an image.
        match cmd {
            ZoomIn => {
                self.viewport.zoom_in();
                return Ok(Outcome::applied(self.zoom_status()));
            }
            ZoomOut => {
                self.viewport.zoom_out();
                return Ok(Outcome::applied(self.zoom_status()));
            }
            ActualSize => {
                self.viewport.actual_size();
                return Ok(Outcome::applied(self.zoom_status()));
            }
            FitToWindow | FillToWindow => {
                let Some((w, h)) = self.image.as_ref().map(|i| i.adjusted.dimensions()) else {
                    return Ok(Outcome::Ignored);
                };
                let fitted = if cmd == FitToWindow {
                    self.viewport.fit_to_window(w, h)
                } else {
                    self.viewport.fill_to_window(w, h)
                };
                return Ok(if fitted {
                    Outcome::applied(self.zoom_status())
                } else {
                    Outcome::Ignored
                });
            }
            _ => {}
        }

        let Some(img) = self.image.as_mut() else {
            return Ok(Outcome::Ignored);
        };

        match cmd {
            RotateLeft => {
                let rotated = ops::rotate_left(&img.baseline);
                commit(img, &mut self.history, rotated, self.adjustments);
                img.rotation_angle = (img.rotation_angle + 90) % 360;
                Ok(Outcome::applied("Rotated left"))
            }
            RotateRight => {
                let rotated = ops::rotate_right(&img.baseline);
                commit(img, &mut self.history, rotated, self.adjustments);
                img.rotation_angle = (img.rotation_angle + 270) % 360;
                Ok(Outcome::applied("Rotated right"))
            }
            FlipHorizontal => {
                let flipped = ops::flip_horizontal(&img.baseline);
                commit(img, &mut self.history, flipped, self.adjustments);
                Ok(Outcome::applied("Flipped horizontally"))
            }
            FlipVertical => {
                let flipped = ops::flip_vertical(&img.baseline);
                commit(img, &mut self.history, flipped, self.adjustments);
                Ok(Outcome::applied("Flipped vertically"))
            }
            Crop {
                left,
                top,
                right,
                bottom,
            } => {
                let cropped = ops::crop(&img.baseline, left, top, right, bottom)?;
                let (w, h) = cropped.dimensions();
                commit(img, &mut self.history, cropped, self.adjustments);
                Ok(Outcome::applied(format!("Cropped to {w}x{h}")))
            }
            Resize { width, height } => {
                let resized = ops::resize(&img.baseline, width, height)?;
                commit(img, &mut self.history, resized, self.adjustments);
                Ok(Outcome::applied(format!("Resized to {width}x{height}")))
            }
            Filter(kind) => {
                if kind == FilterKind::None {
                    return Ok(Outcome::Ignored);
                }
                let filtered = filters::apply(&img.baseline, kind);
                commit(img, &mut self.history, filtered, self.adjustments);
                Ok(Outcome::applied(format!("Applied {kind} filter")))
            }
            SetBrightness(v) => {
                let v = v.clamp(ops::ADJUST_MIN, ops::ADJUST_MAX);
                self.adjustments.brightness = v;
                refresh_adjusted(img, self.adjustments);
                Ok(Outcome::applied(format!("Brightness: {v:.2}")))
            }
            SetContrast(v) => {
                let v = v.clamp(ops::ADJUST_MIN, ops::ADJUST_MAX);
                self.adjustments.contrast = v;
                refresh_adjusted(img, self.adjustments);
                Ok(Outcome::applied(format!("Contrast: {v:.2}")))
            }
            SetSharpness(v) => {
                let v = v.clamp(ops::ADJUST_MIN, ops::ADJUST_MAX);
                self.adjustments.sharpness = v;
                refresh_adjusted(img, self.adjustments);
                Ok(Outcome::applied(format!("Sharpness: {v:.2}")))
            }
            Reset => {
                let original = img.original.clone();
                self.adjustments = Adjustments::default();
                commit(img, &mut self.history, original, self.adjustments);
                img.rotation_angle = 0;
                Ok(Outcome::applied("Reset to original"))
            }
            Undo => {
                if self.history.undo(&mut img.baseline) {
                    refresh_adjusted(img, self.adjustments);
                    Ok(Outcome::applied("Undone"))
                } else {
                    Ok(Outcome::Ignored)
                }
            }
            Redo => {
                if self.history.redo(&mut img.baseline) {
                    refresh_adjusted(img, self.adjustments);
                    Ok(Outcome::applied("Redone"))
                } else {
                    Ok(Outcome::Ignored)
                }
            }
            // View commands were handled above.
            ZoomIn | ZoomOut | ActualSize | FitToWindow | FillToWindow => Ok(Outcome::Ignored),
        }
    }

    // --- crop interaction ------------------------------------------------

    /// Enter crop mode. The next pointer drag selects the region.
    pub fn begin_crop(&mut self) {
        if self.image.is_some() {
            self.crop = CropState::Armed;
        }
    }

    pub fn cancel_crop(&mut self) {
        self.crop = CropState::Inactive;
    }

    /// Pointer pressed at device coordinates on the rendered image.
    pub fn crop_pointer_down(&mut self, x: f64, y: f64) {
        if matches!(self.crop, CropState::Armed) {
            self.crop = CropState::Dragging { anchor: (x, y) };
        }
    }

    /// Pointer released. A drag shorter than [`CROP_DRAG_THRESHOLD`] on
    /// either axis is treated as a stray click and leaves the image alone;
    /// otherwise the selection is mapped through the zoom factor into
    /// image coordinates and committed.
    pub fn crop_pointer_up(&mut self, x: f64, y: f64) -> Result<Outcome, ViewerError> {
        let CropState::Dragging { anchor: (ax, ay) } = self.crop else {
            return Ok(Outcome::Ignored);
        };
        self.crop = CropState::Inactive;

        if (x - ax).abs() <= CROP_DRAG_THRESHOLD || (y - ay).abs() <= CROP_DRAG_THRESHOLD {
            return Ok(Outcome::Ignored);
        }

        let zoom = self.viewport.zoom() as f64;
        let to_image = |v: f64| (v / zoom).round().max(0.0) as u32;
        let left = to_image(ax.min(x));
        let right = to_image(ax.max(x));
        let top = to_image(ay.min(y));
        let bottom = to_image(ay.max(y));

        self.dispatch(EditCommand::Crop {
            left,
            top,
            right,
            bottom,
        })
    }

    // --- status ----------------------------------------------------------

    fn zoom_status(&self) -> String {
        format!("Zoom: {}%", (self.viewport.zoom() * 100.0).round() as i32)
    }

    /// Status-bar line: "IMG_0042.heic | 4032x3024 | 2.1 MB | Zoom: 95%".
    pub fn image_info(&self) -> Option<String> {
        let img = self.image.as_ref()?;
        let name = img
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| img.path.display().to_string());
        let (w, h) = img.adjusted.dimensions();
        Some(format!(
            "{name} | {w}x{h} | {} | {}",
            format_file_size(img.file_size),
            self.zoom_status()
        ))
    }

}

/// Commit a new baseline: record the pre-edit state, swap in the new
/// pixels, recompute the adjusted view.
fn commit(
    img: &mut LoadedImage,
    history: &mut EditHistory,
    new_baseline: ImageBuffer,
    adjustments: Adjustments,
) {
    let pre_edit = std::mem::replace(&mut img.baseline, new_baseline);
    history.push(pre_edit);
    refresh_adjusted(img, adjustments);
}

fn refresh_adjusted(img: &mut LoadedImage, adjustments: Adjustments) {
    img.adjusted = if adjustments.is_identity() {
        img.baseline.clone()
    } else {
        ops::adjust(
            &img.baseline,
            adjustments.brightness,
            adjustments.contrast,
            adjustments.sharpness,
        )
    };
}
