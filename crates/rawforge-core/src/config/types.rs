//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// RAW container extensions accepted as conversion inputs.
pub const RAW_EXTENSIONS: &[&str] = &[
    "arw", "cr2", "cr3", "crw", "dng", "nef", "nrw", "raw", "orf", "rw2", "pef", "srw", "mos",
    "mrw", "erf", "kdc", "dcr", "raf", "3fr", "fff", "iiq", "rwl", "x3f",
];

/// Standard image formats accepted for testing convenience.
pub const STANDARD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory containing `<Brand><Model>-<Scene>.icm` profile files
    pub profile_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("~/.rawforge/profiles"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Explicit worker cap; unset means size from CPU and memory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_threads: Option<usize>,

    /// Descend into subdirectories when scanning inputs
    pub recursive: bool,

    /// Supported input extensions
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_threads: None,
            recursive: true,
            supported_formats: RAW_EXTENSIONS
                .iter()
                .chain(STANDARD_EXTENSIONS)
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// White balance source used while developing RAW data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WhiteBalance {
    /// As-shot multipliers recorded by the camera
    #[default]
    Camera,
    /// Gray-world estimate from the image itself
    Auto,
    /// Unity multipliers
    None,
}

/// RAW development settings passed to the image codec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    pub white_balance: WhiteBalance,

    /// Bits per channel of the developed buffer (8 or 16)
    pub output_bits: u8,

    /// Linear brightness multiplier
    pub brightness: f32,

    /// Scale exposure so the brightest highlights reach full scale
    pub auto_brightness: bool,

    /// Develop at half resolution (2x2 superpixels)
    pub half_size: bool,

    /// Exposure shift in stops
    pub exposure_shift: f32,

    /// Roll off highlights instead of clipping them
    pub preserve_highlights: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            white_balance: WhiteBalance::Camera,
            output_bits: 8,
            brightness: 1.0,
            auto_brightness: true,
            half_size: false,
            exposure_shift: 0.0,
            preserve_highlights: true,
        }
    }
}

/// JPEG output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Extension given to converted files
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 95,
            extension: "jpg".to_string(),
        }
    }
}

/// Color-correction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Apply a camera profile to each output
    pub enabled: bool,

    /// Read brand/model from each file's metadata
    pub auto_detect: bool,

    /// Fail the file when correction cannot be applied
    pub strict: bool,

    /// Brand override (empty = use detected brand)
    pub brand: String,

    /// Model override (empty = use detected model)
    pub model: String,

    /// Scene variant to look up
    pub scene: String,

    /// Explicit profile file, used when it exists on disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<PathBuf>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_detect: true,
            strict: true,
            brand: String::new(),
            model: String::new(),
            scene: "Generic".to_string(),
            profile_path: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
