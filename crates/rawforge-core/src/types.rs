//! Core data types for the rawforge conversion pipeline.
//!
//! These types describe camera identity and the per-file outcome of a
//! conversion run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Raw, unnormalized camera identity as embedded in a file's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    /// Manufacturer string (e.g. "NIKON CORPORATION")
    pub make: String,

    /// Model string (e.g. "NIKON D850")
    pub model: String,
}

impl CameraInfo {
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
        }
    }

    /// True when neither make nor model carries any text.
    pub fn is_empty(&self) -> bool {
        self.make.trim().is_empty() && self.model.trim().is_empty()
    }
}

/// Standardized camera brands recognized by the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Brand {
    Canon,
    Nikon,
    Sony,
    Fujifilm,
    Olympus,
    Panasonic,
    Leica,
    Pentax,
    Samsung,
    Apple,
    Hasselblad,
    PhaseOne,
    Mamiya,
    Leaf,
    Contax,
    Kodak,
    Unknown,
}

impl Brand {
    /// Every known brand, in table order (Unknown excluded).
    pub const KNOWN: [Brand; 16] = [
        Brand::Canon,
        Brand::Nikon,
        Brand::Sony,
        Brand::Fujifilm,
        Brand::Olympus,
        Brand::Panasonic,
        Brand::Leica,
        Brand::Pentax,
        Brand::Samsung,
        Brand::Apple,
        Brand::Hasselblad,
        Brand::PhaseOne,
        Brand::Mamiya,
        Brand::Leaf,
        Brand::Contax,
        Brand::Kodak,
    ];

    /// Canonical display name, as used in profile filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Canon => "Canon",
            Brand::Nikon => "Nikon",
            Brand::Sony => "Sony",
            Brand::Fujifilm => "Fujifilm",
            Brand::Olympus => "Olympus",
            Brand::Panasonic => "Panasonic",
            Brand::Leica => "Leica",
            Brand::Pentax => "Pentax",
            Brand::Samsung => "Samsung",
            Brand::Apple => "Apple",
            Brand::Hasselblad => "Hasselblad",
            Brand::PhaseOne => "PhaseOne",
            Brand::Mamiya => "Mamiya",
            Brand::Leaf => "Leaf",
            Brand::Contax => "Contax",
            Brand::Kodak => "Kodak",
            Brand::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Brand::Unknown
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder used for a model that could not be determined.
pub const UNKNOWN_MODEL: &str = "Unknown";

/// Camera identity after brand/model normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCamera {
    pub brand: Brand,
    pub model: String,
}

impl NormalizedCamera {
    pub fn unknown() -> Self {
        Self {
            brand: Brand::Unknown,
            model: UNKNOWN_MODEL.to_string(),
        }
    }

    /// Brand name if it was determined.
    pub fn known_brand(&self) -> Option<&'static str> {
        self.brand.is_known().then(|| self.brand.as_str())
    }

    /// Model name if it was determined.
    pub fn known_model(&self) -> Option<&str> {
        (self.model != UNKNOWN_MODEL).then_some(self.model.as_str())
    }
}

impl fmt::Display for NormalizedCamera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.brand, self.model)
    }
}

/// Lifecycle state of a single file conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Skipped,
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversionStatus::Pending => "pending",
            ConversionStatus::Processing => "processing",
            ConversionStatus::Completed => "completed",
            ConversionStatus::Failed => "failed",
            ConversionStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// The outcome of converting one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    // === Paths ===
    /// Source RAW file
    pub input_path: PathBuf,

    /// Destination JPEG file
    pub output_path: PathBuf,

    // === Outcome ===
    pub status: ConversionStatus,

    /// Human-readable reason for a failure, skip or cancellation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    // === Timing ===
    pub started_at: SystemTime,
    pub finished_at: SystemTime,

    /// Time spent on this file in seconds
    pub processing_seconds: f64,

    // === Sizes ===
    /// Input size in bytes
    pub input_size: u64,

    /// Output size in bytes (0 unless completed)
    pub output_size: u64,

    // === Color correction ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_brand: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_model: Option<String>,

    /// Whether a color profile was actually applied to the output
    pub profile_applied: bool,

    /// The profile that was resolved for this file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,

    /// Non-fatal problem, e.g. correction skipped in lenient mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ConversionResult {
    /// A result for a file whose job never ran.
    pub fn pending(input_path: &Path, output_path: &Path) -> Self {
        let now = SystemTime::now();
        Self {
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
            status: ConversionStatus::Pending,
            error_message: None,
            started_at: now,
            finished_at: now,
            processing_seconds: 0.0,
            input_size: 0,
            output_size: 0,
            detected_brand: None,
            detected_model: None,
            profile_applied: false,
            profile_path: None,
            warning: None,
        }
    }

    /// File name of the input, for status lines.
    pub fn file_name(&self) -> String {
        self.input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input_path.display().to_string())
    }

    /// One-line description of the outcome (`completed: a.nef`, ...).
    pub fn status_line(&self) -> String {
        let name = self.file_name();
        match self.status {
            ConversionStatus::Completed => format!("completed: {name}"),
            ConversionStatus::Failed => format!(
                "failed: {name} - {}",
                self.error_message.as_deref().unwrap_or("unknown error")
            ),
            ConversionStatus::Skipped => format!("skipped: {name}"),
            ConversionStatus::Pending | ConversionStatus::Processing => {
                format!("{}: {name}", self.status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        let mut result =
            ConversionResult::pending(Path::new("/in/a/DSC_0001.NEF"), Path::new("/out/a.jpg"));
        result.status = ConversionStatus::Completed;
        assert_eq!(result.status_line(), "completed: DSC_0001.NEF");

        result.status = ConversionStatus::Skipped;
        assert_eq!(result.status_line(), "skipped: DSC_0001.NEF");

        result.status = ConversionStatus::Failed;
        result.error_message = Some("Decode error".into());
        assert_eq!(result.status_line(), "failed: DSC_0001.NEF - Decode error");
    }

    #[test]
    fn test_result_serde_skips_empty_fields() {
        let result = ConversionResult::pending(Path::new("a.cr2"), Path::new("a.jpg"));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"pending\""));
        assert!(!json.contains("profile_path"));
        assert!(!json.contains("error_message"));
    }

    #[test]
    fn test_normalized_camera_known_parts() {
        let camera = NormalizedCamera {
            brand: Brand::Nikon,
            model: "D850".into(),
        };
        assert_eq!(camera.known_brand(), Some("Nikon"));
        assert_eq!(camera.known_model(), Some("D850"));
        assert_eq!(NormalizedCamera::unknown().known_brand(), None);
        assert_eq!(NormalizedCamera::unknown().known_model(), None);
    }
}
