//! Shared test utilities for creating temporary files and common test operations.

use bareblocks::InspectionReport;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

/// Creates a temporary file with the given content.
///
/// The file is removed when the returned `NamedTempFile` is dropped.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Writes `content` under `name` inside a fresh temporary directory, so the
/// file name (and therefore the extension sniff) is under test control.
pub fn create_named_file(name: &str, content: &[u8]) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

/// Asserts the byte accounting invariant of a report.
pub fn assert_bytes_accounted(report: &InspectionReport) {
    let s = report.structure();
    assert_eq!(
        s.pixel_bytes + s.non_pixel_bytes,
        s.total_bytes,
        "pixel {} + non-pixel {} != total {}",
        s.pixel_bytes,
        s.non_pixel_bytes,
        s.total_bytes
    );
    let ratio = report.anomalies().non_pixel_ratio;
    assert!((0.0..=1.0).contains(&ratio), "ratio {} out of range", ratio);
}
