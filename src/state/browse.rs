/// Sibling-file navigation and the slideshow timer state.
///
/// The browser scans the opened file's directory once (non-recursive) and
/// keeps a sorted list of every supported image in it. Next/previous stop
/// at the ends; the slideshow wraps back to the first file instead.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::codec;

#[derive(Debug, Clone, Default)]
pub struct DirectoryBrowser {
    files: Vec<PathBuf>,
    index: usize,
}

impl DirectoryBrowser {
    /// Scan the directory containing `current` for supported images and
    /// position the cursor on `current` itself.
    pub fn scan(current: &Path) -> Self {
        let dir = match current.parent() {
            Some(d) => d,
            None => return DirectoryBrowser::default(),
        };

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| codec::is_supported(p))
            .collect();
        files.sort();

        let index = files.iter().position(|p| p == current).unwrap_or(0);
        DirectoryBrowser { files, index }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn current(&self) -> Option<&Path> {
        self.files.get(self.index).map(PathBuf::as_path)
    }

    /// 1-based position for the status line ("3 / 12").
    pub fn position(&self) -> (usize, usize) {
        if self.files.is_empty() {
            (0, 0)
        } else {
            (self.index + 1, self.files.len())
        }
    }

    /// Advance to the next file. No-op at the end of the directory.
    pub fn next(&mut self) -> Option<&Path> {
        if self.index + 1 < self.files.len() {
            self.index += 1;
            self.current()
        } else {
            None
        }
    }

    /// Step back to the previous file. No-op at the start.
    pub fn previous(&mut self) -> Option<&Path> {
        if self.index > 0 {
            self.index -= 1;
            self.current()
        } else {
            None
        }
    }

    /// Advance, wrapping to the first file at the end. Used by the
    /// slideshow so it loops instead of stopping.
    pub fn next_wrapping(&mut self) -> Option<&Path> {
        if self.files.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.files.len();
        self.current()
    }
}

/// Whether the slideshow is running and how fast it steps. The Presenter
/// owns the actual timer; this is just the state it consults.
#[derive(Debug, Clone)]
pub struct SlideshowState {
    pub active: bool,
    pub delay_secs: u64,
}

impl Default for SlideshowState {
    fn default() -> Self {
        SlideshowState {
            active: false,
            delay_secs: 3,
        }
    }
}

impl SlideshowState {
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    pub fn stop(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "c.jpg");
        let b = touch(tmp.path(), "b.png");
        touch(tmp.path(), "a.heic");
        touch(tmp.path(), "notes.txt");

        let browser = DirectoryBrowser::scan(&b);
        assert_eq!(browser.len(), 3);
        assert_eq!(browser.position(), (2, 3));
        assert_eq!(browser.current(), Some(b.as_path()));
    }

    #[test]
    fn test_next_previous_stop_at_ends() {
        let tmp = tempfile::tempdir().unwrap();
        let a = touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "b.jpg");

        let mut browser = DirectoryBrowser::scan(&a);
        assert!(browser.previous().is_none());
        assert!(browser.next().is_some());
        assert!(browser.next().is_none());
        assert_eq!(browser.position(), (2, 2));
    }

    #[test]
    fn test_slideshow_wraps() {
        let tmp = tempfile::tempdir().unwrap();
        let a = touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "b.jpg");

        let mut browser = DirectoryBrowser::scan(&a);
        browser.next_wrapping();
        assert_eq!(browser.position(), (2, 2));
        browser.next_wrapping();
        assert_eq!(browser.position(), (1, 2));
    }

    #[test]
    fn test_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let ghost = tmp.path().join("ghost.jpg");
        let mut browser = DirectoryBrowser::scan(&ghost);
        assert!(browser.is_empty());
        assert!(browser.next_wrapping().is_none());
        assert_eq!(browser.position(), (0, 0));
    }

    #[test]
    fn test_slideshow_toggle() {
        let mut slideshow = SlideshowState::default();
        assert!(slideshow.toggle());
        assert!(slideshow.active);
        slideshow.stop();
        assert!(!slideshow.active);
    }
}
