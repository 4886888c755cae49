//! Error types for the rawforge conversion pipeline.
//!
//! Errors are organized by stage so each per-file failure carries a message
//! that names the file and the step that went wrong. Per-file errors are
//! captured into that file's `ConversionResult`; only scan failures escape a
//! batch.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for rawforge operations.
#[derive(Error, Debug)]
pub enum RawForgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Conversion errors that abort a whole batch
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Conversion errors, organized by stage.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Camera identification found nothing usable
    #[error("No camera metadata available for {path}")]
    MetadataUnavailable { path: PathBuf },

    /// No profile file matches the requested camera and scene
    #[error("No color profile found for {brand} {model} ({scene})")]
    ProfileNotFound {
        brand: String,
        model: String,
        scene: String,
    },

    /// A resolved profile file could not be opened
    #[error("Failed to load color profile {path}: {message}")]
    ProfileLoadFailed { path: PathBuf, message: String },

    /// The color transform itself failed
    #[error("Color correction with {profile} failed: {message}")]
    ColorTransformFailed { profile: PathBuf, message: String },

    /// RAW decoding failed
    #[error("Decode error for {path}: {message}")]
    DecodeFailed { path: PathBuf, message: String },

    /// JPEG encoding or writing failed
    #[error("Encode error for {path}: {message}")]
    EncodeFailed { path: PathBuf, message: String },

    /// The destination directory could not be created
    #[error("Cannot prepare output directory {path}: {message}")]
    OutputPrepare { path: PathBuf, message: String },

    /// Destination already exists (routes to Skipped)
    #[error("Output already exists: {0}")]
    OutputExists(PathBuf),

    /// Input enumeration failed
    #[error("Failed to scan {path}: {message}")]
    ScanFailed { path: PathBuf, message: String },

    /// A worker task ended without producing a result
    #[error("Conversion task failed for {path}: {message}")]
    Task { path: PathBuf, message: String },
}

impl ConversionError {
    /// Whether this error belongs to the color-correction class whose
    /// severity depends on strict mode.
    pub fn is_color_correction(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound { .. }
                | Self::ProfileLoadFailed { .. }
                | Self::ColorTransformFailed { .. }
        )
    }
}

/// Errors reported by an image codec implementation.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("RAW decoder: {0}")]
    Raw(String),

    #[error("Unsupported input: {0}")]
    Unsupported(String),
}

/// Errors reported by a color-management implementation.
#[derive(Error, Debug)]
pub enum ColorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Transform failed: {0}")]
    Transform(String),
}

/// Convenience type alias for rawforge results.
pub type Result<T> = std::result::Result<T, RawForgeError>;

/// Convenience type alias for per-file conversion results.
pub type ConversionOutcome<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_correction_classification() {
        let not_found = ConversionError::ProfileNotFound {
            brand: "Nikon".into(),
            model: "D850".into(),
            scene: "Generic".into(),
        };
        assert!(not_found.is_color_correction());

        let load = ConversionError::ProfileLoadFailed {
            path: PathBuf::from("NikonD850-Generic.icm"),
            message: "unreadable".into(),
        };
        assert!(load.is_color_correction());

        let transform = ConversionError::ColorTransformFailed {
            profile: PathBuf::from("NikonD850-Generic.icm"),
            message: "bad lut".into(),
        };
        assert!(transform.is_color_correction());

        let encode = ConversionError::EncodeFailed {
            path: PathBuf::from("a.jpg"),
            message: "disk full".into(),
        };
        assert!(!encode.is_color_correction());
        assert!(!ConversionError::OutputExists(PathBuf::from("a.jpg")).is_color_correction());

        let decode = ConversionError::DecodeFailed {
            path: PathBuf::from("a.nef"),
            message: "truncated".into(),
        };
        assert!(!decode.is_color_correction());
    }

    #[test]
    fn test_profile_not_found_message() {
        let err = ConversionError::ProfileNotFound {
            brand: "Nikon".into(),
            model: "D850".into(),
            scene: "Generic".into(),
        };
        assert_eq!(
            err.to_string(),
            "No color profile found for Nikon D850 (Generic)"
        );
    }
}
