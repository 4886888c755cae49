//! Configuration management for rawforge.
//!
//! Configuration is loaded from `~/.rawforge/config.toml` (or the platform
//! config directory) with sensible defaults. A run receives an immutable
//! [`ConversionConfig`] derived from it.

mod conversion;
mod types;
mod validate;

pub use conversion::ConversionConfig;
pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for rawforge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// RAW development settings
    pub decode: DecodeConfig,

    /// JPEG output settings
    pub output: OutputConfig,

    /// Color-correction settings
    pub color: ColorConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.rawforge.rawforge/config.toml
    /// - Linux: ~/.config/rawforge/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\rawforge\config\config.toml
    ///
    /// Falls back to ~/.rawforge/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "rawforge", "rawforge")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".rawforge").join("config.toml")
            })
    }

    /// Get the resolved profile directory path (with ~ expansion).
    pub fn profile_dir(&self) -> PathBuf {
        let path_str = self.general.profile_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Build the immutable per-run conversion settings.
    pub fn conversion(&self) -> ConversionConfig {
        ConversionConfig::from_config(self)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
