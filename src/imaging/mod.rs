/// In-memory edit pipeline: the image value type and the pure transforms
/// that map one buffer to the next.

pub mod buffer;
pub mod filters;
pub mod ops;

pub use buffer::{ImageBuffer, PixelMode};
pub use filters::FilterKind;
