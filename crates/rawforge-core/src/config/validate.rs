//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::ValidationError(
                "processing.max_threads must be > 0 when set".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::ValidationError(
                "output.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        if self.output.extension.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.extension must not be empty".into(),
            ));
        }
        if !matches!(self.decode.output_bits, 8 | 16) {
            return Err(ConfigError::ValidationError(
                "decode.output_bits must be 8 or 16".into(),
            ));
        }
        if !(self.decode.brightness > 0.0) {
            return Err(ConfigError::ValidationError(
                "decode.brightness must be > 0".into(),
            ));
        }
        if !(-8.0..=8.0).contains(&self.decode.exposure_shift) {
            return Err(ConfigError::ValidationError(
                "decode.exposure_shift must be between -8 and 8 stops".into(),
            ));
        }
        if self.color.scene.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "color.scene must not be empty".into(),
            ));
        }
        Ok(())
    }
}
