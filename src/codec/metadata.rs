//! EXIF extraction and humanised file info.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read EXIF fields as display-ready key/value pairs. Missing or
/// unparseable EXIF is not an error; most PNGs and screenshots have none.
pub fn read_exif(path: &Path) -> Vec<(String, String)> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return Vec::new(),
    };
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    exif.fields()
        .filter(|f| f.ifd_num == exif::In::PRIMARY)
        .map(|f| {
            (
                f.tag.to_string(),
                f.display_value().with_unit(&exif).to_string(),
            )
        })
        .collect()
}

/// "123 B", "4.2 KB", "1.3 MB".
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1024.0 * 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f >= MB {
        format!("{:.1} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}
