//! Color management behind a narrow trait.
//!
//! The engine only opens profiles and applies them; the transform math lives
//! in the implementation ([`LcmsColorManager`] in production, a mock in
//! tests).

mod lcms;

pub use lcms::LcmsColorManager;

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ColorError;

/// Output color spaces that are always available without a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardProfile {
    #[default]
    Srgb,
}

/// An opened color profile.
///
/// Cheap to clone: the ICC bytes are shared, so the catalog cache and every
/// worker can hold the same handle.
#[derive(Debug, Clone)]
pub struct ProfileHandle {
    path: PathBuf,
    icc: Arc<[u8]>,
}

impl ProfileHandle {
    pub fn new(path: impl Into<PathBuf>, icc: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            icc: Arc::from(icc),
        }
    }

    /// File the profile was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw ICC profile bytes.
    pub fn icc(&self) -> &[u8] {
        &self.icc
    }
}

/// Color-management capability used during conversion.
pub trait ColorManager: Send + Sync {
    /// Open and validate a profile file.
    fn open_profile(&self, path: &Path) -> Result<ProfileHandle, ColorError>;

    /// Convert `image` from `source` into `destination`, returning a new
    /// buffer.
    fn transform(
        &self,
        image: &DynamicImage,
        source: &ProfileHandle,
        destination: StandardProfile,
    ) -> Result<DynamicImage, ColorError>;
}
