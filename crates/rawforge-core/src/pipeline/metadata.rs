//! Camera make/model extraction from EXIF.

use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::types::CameraInfo;

/// Reads camera identity from EXIF-bearing containers (TIFF-based RAW,
/// DNG, JPEG, ...).
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract make and model from a file.
    ///
    /// Returns `None` if the file has no EXIF data, neither tag is present,
    /// or reading fails.
    pub fn extract(path: &Path) -> Option<CameraInfo> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = Reader::new().read_from_container(&mut reader).ok()?;

        let info = CameraInfo {
            make: Self::get_string(&exif, Tag::Make).unwrap_or_default(),
            model: Self::get_string(&exif, Tag::Model).unwrap_or_default(),
        };

        (!info.is_empty()).then_some(info)
    }

    /// Get a string field from EXIF data.
    fn get_string(exif: &exif::Exif, tag: Tag) -> Option<String> {
        exif.get_field(tag, In::PRIMARY).map(|f| {
            let s = f.display_value().to_string();
            // Clean up the string (remove quotes and padding)
            s.trim_matches('"').trim().to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_missing_file() {
        let result = MetadataExtractor::extract(Path::new("/nonexistent/file.nef"));
        assert!(result.is_none());
    }

    #[test]
    fn test_extract_without_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        image::RgbImage::new(4, 4).save(&path).unwrap();

        assert!(MetadataExtractor::extract(&path).is_none());
    }
}
