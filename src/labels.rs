// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Class-name label loading.
//!
//! Labels come one per line, index-aligned with the model's class ids.
//! Blank interior lines are kept as empty strings so indices stay aligned.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Parse newline-delimited labels, trimming each line.
#[must_use]
pub fn parse_labels(content: &str) -> Vec<String> {
    content.lines().map(|line| line.trim().to_string()).collect()
}

/// Load labels from a file, one per line.
///
/// # Errors
///
/// Returns [`crate::PostprocessError::Io`] if the file cannot be read.
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_labels(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostprocessError;

    #[test]
    fn test_parse_labels_basic() {
        let labels = parse_labels("person\nbicycle\ncar\n");
        assert_eq!(labels, vec!["person", "bicycle", "car"]);
    }

    #[test]
    fn test_parse_labels_trims_and_keeps_interior_blanks() {
        let labels = parse_labels("  person \t\n\nbicycle");
        assert_eq!(labels, vec!["person", "", "bicycle"]);
    }

    #[test]
    fn test_parse_labels_windows_line_endings() {
        let labels = parse_labels("person\r\nbicycle\r\n");
        assert_eq!(labels, vec!["person", "bicycle"]);
    }

    #[test]
    fn test_load_labels_roundtrip() {
        let path = std::env::temp_dir().join("yolo_postprocess_labels_test.txt");
        fs::write(&path, "person\nbicycle\n").unwrap();
        let labels = load_labels(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(labels, vec!["person", "bicycle"]);
    }

    #[test]
    fn test_load_labels_missing_file() {
        let err = load_labels("definitely/not/a/real/labels.txt").unwrap_err();
        assert!(matches!(err, PostprocessError::Io(_)));
    }
}
