use std::path::PathBuf;
use thiserror::Error;

/// Error types for the viewer pipeline.
///
/// All of these are local and non-fatal: a failed operation leaves the
/// session state (baseline, adjusted, history) exactly as it was.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The file could not be parsed as an image.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// The image could not be written out.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// An operation was rejected before touching any state
    /// (degenerate crop rectangle, non-positive resize, bad quality value).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// I/O error outside of decode/encode proper.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ViewerError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
