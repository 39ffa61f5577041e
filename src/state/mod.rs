/// State management module
///
/// This module holds all application state:
/// - The edit session and command dispatch (session.rs)
/// - Undo/redo history (history.rs)
/// - Zoom and render geometry (viewport.rs)
/// - Directory browsing and slideshow (browse.rs)
/// - Persisted user settings (settings.rs)

pub mod browse;
pub mod history;
pub mod session;
pub mod settings;
pub mod viewport;

pub use browse::{DirectoryBrowser, SlideshowState};
pub use history::EditHistory;
pub use session::{Adjustments, CropState, EditCommand, EditSession, Mutation, Outcome};
pub use settings::Settings;
pub use viewport::ViewportState;
