/// User preferences, persisted as a flat JSON key/value file in the home
/// directory. Loading is best-effort: a missing file, unreadable JSON or
/// absent keys all fall back to defaults. Saving overwrites the whole file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// At most this many entries in the recent-files list.
pub const MAX_RECENT_FILES: usize = 10;

const SETTINGS_FILE_NAME: &str = ".heicviewer_settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub is_dark_mode: bool,
    pub show_info: bool,
    /// JPEG/WebP export quality, 1-100.
    pub quality_value: u8,
    /// Most-recent-first, de-duplicated, capped at `MAX_RECENT_FILES`.
    pub recent_files: Vec<PathBuf>,
    /// Seconds between slideshow steps, 1-10.
    pub slideshow_delay_secs: u64,
    pub last_save_directory: PathBuf,
    pub last_open_directory: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Settings {
            is_dark_mode: true,
            show_info: true,
            quality_value: 90,
            recent_files: Vec::new(),
            slideshow_delay_secs: 3,
            last_save_directory: home.clone(),
            last_open_directory: home,
        }
    }
}

impl Settings {
    /// Default on-disk location: `~/.heicviewer_settings.json`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SETTINGS_FILE_NAME)
    }

    /// Load from `path`, falling back to defaults on any failure and
    /// clamping out-of-range values.
    pub fn load(path: &Path) -> Self {
        let mut settings: Settings = fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        settings.sanitize();
        settings
    }

    /// Whole-file overwrite.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    fn sanitize(&mut self) {
        self.quality_value = self.quality_value.clamp(1, 100);
        self.slideshow_delay_secs = self.slideshow_delay_secs.clamp(1, 10);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    /// Move (or insert) `path` to the front of the recent-files list.
    pub fn add_recent_file(&mut self, path: &Path) {
        self.recent_files.retain(|p| p != path);
        self.recent_files.insert(0, path.to_path_buf());
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.is_dark_mode);
        assert!(s.show_info);
        assert_eq!(s.quality_value, 90);
        assert_eq!(s.slideshow_delay_secs, 3);
        assert!(s.recent_files.is_empty());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(&dir.path().join("nope.json"));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_load_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"quality_value": 55}"#).unwrap();
        let s = Settings::load(&path);
        assert_eq!(s.quality_value, 55);
        assert!(s.is_dark_mode);
        assert_eq!(s.slideshow_delay_secs, 3);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut s = Settings::default();
        s.is_dark_mode = false;
        s.quality_value = 75;
        s.add_recent_file(Path::new("/photos/a.heic"));
        s.save(&path).unwrap();

        assert_eq!(Settings::load(&path), s);
    }

    #[test]
    fn test_out_of_range_values_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"quality_value": 0, "slideshow_delay_secs": 99}"#,
        )
        .unwrap();
        let s = Settings::load(&path);
        assert_eq!(s.quality_value, 1);
        assert_eq!(s.slideshow_delay_secs, 10);
    }

    #[test]
    fn test_recent_files_dedup_and_cap() {
        let mut s = Settings::default();
        for i in 0..15 {
            s.add_recent_file(Path::new(&format!("/photos/{i}.jpg")));
        }
        assert_eq!(s.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(s.recent_files[0], Path::new("/photos/14.jpg"));

        // Re-opening an existing entry moves it to the front, no duplicate.
        s.add_recent_file(Path::new("/photos/10.jpg"));
        assert_eq!(s.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(s.recent_files[0], Path::new("/photos/10.jpg"));
        let count = s
            .recent_files
            .iter()
            .filter(|p| *p == Path::new("/photos/10.jpg"))
            .count();
        assert_eq!(count, 1);
    }
}
