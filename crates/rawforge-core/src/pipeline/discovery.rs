//! Input discovery: finding convertible files in directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ConversionConfig;
use crate::error::ConversionError;

/// Finds supported input files.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    supported_formats: Vec<String>,
    recursive: bool,
}

impl FileDiscovery {
    pub fn new(supported_formats: Vec<String>, recursive: bool) -> Self {
        Self {
            supported_formats: supported_formats
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            recursive,
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(config.supported_formats.clone(), config.recursive)
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// Scan using the configured recursion setting.
    pub fn discover(&self, path: &Path) -> Result<Vec<PathBuf>, ConversionError> {
        self.scan(path, self.recursive)
    }

    /// List supported files under `path`, sorted by path.
    ///
    /// A file path is returned as-is when supported. A missing or unreadable
    /// root fails the scan; unreadable entries below it are skipped.
    pub fn scan(&self, path: &Path, recursive: bool) -> Result<Vec<PathBuf>, ConversionError> {
        if !path.exists() {
            return Err(ConversionError::ScanFailed {
                path: path.to_path_buf(),
                message: "path does not exist".to_string(),
            });
        }

        if path.is_file() {
            return Ok(if self.is_supported(path) {
                vec![path.to_path_buf()]
            } else {
                vec![]
            });
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(path).max_depth(max_depth).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ConversionError::ScanFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {:?}: {}", path, e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }

        // Sort by path for deterministic ordering
        files.sort();
        tracing::debug!("Found {} input files in {:?}", files.len(), path);
        Ok(files)
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}
