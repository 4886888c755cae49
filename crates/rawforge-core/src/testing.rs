//! Test doubles for the codec and color-management seams.

use image::DynamicImage;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::color::{ColorManager, ProfileHandle, StandardProfile};
use crate::config::DecodeConfig;
use crate::error::{CodecError, ColorError};
use crate::pipeline::ImageCodec;
use crate::types::CameraInfo;

/// Bytes the mock encoder writes.
pub const MOCK_JPEG: &[u8] = b"\xFF\xD8mock-jpeg\xFF\xD9";

/// Codec that never touches pixel data.
///
/// Files whose name contains `corrupt` fail to decode; outputs whose name
/// contains `unwritable` fail to encode. Metadata is looked up by input
/// file name.
#[derive(Default)]
pub struct MockCodec {
    metadata: HashMap<String, CameraInfo>,
    delay: Option<Duration>,
    decodes: AtomicUsize,
    encodes: AtomicUsize,
}

impl MockCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, file_name: &str, make: &str, model: &str) -> Self {
        self.metadata
            .insert(file_name.to_string(), CameraInfo::new(make, model));
        self
    }

    /// Sleep this long inside every decode.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }

    pub fn encode_count(&self) -> usize {
        self.encodes.load(Ordering::SeqCst)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ImageCodec for MockCodec {
    fn decode(&self, path: &Path, _options: &DecodeConfig) -> Result<DynamicImage, CodecError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if file_name(path).contains("corrupt") {
            return Err(CodecError::Raw("corrupt sensor data".into()));
        }
        std::fs::metadata(path)?;
        Ok(DynamicImage::new_rgb8(4, 4))
    }

    fn encode(&self, path: &Path, _image: &DynamicImage, _quality: u8) -> Result<(), CodecError> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        if file_name(path).contains("unwritable") {
            return Err(CodecError::Unsupported("read-only destination".into()));
        }
        std::fs::write(path, MOCK_JPEG)?;
        Ok(())
    }

    fn read_camera_metadata(&self, path: &Path) -> Option<CameraInfo> {
        self.metadata.get(&file_name(path)).cloned()
    }
}

/// Color manager that validates nothing but file presence.
///
/// Profiles whose contents start with `bad` fail to open.
#[derive(Default)]
pub struct MockColorManager {
    fail_transform: bool,
    opens: AtomicUsize,
    transforms: AtomicUsize,
}

impl MockColorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_transform() -> Self {
        Self {
            fail_transform: true,
            ..Self::default()
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn transform_count(&self) -> usize {
        self.transforms.load(Ordering::SeqCst)
    }
}

impl ColorManager for MockColorManager {
    fn open_profile(&self, path: &Path) -> Result<ProfileHandle, ColorError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let bytes = std::fs::read(path)?;
        if bytes.starts_with(b"bad") {
            return Err(ColorError::InvalidProfile(format!(
                "{}: unrecognized header",
                path.display()
            )));
        }
        Ok(ProfileHandle::new(path, bytes))
    }

    fn transform(
        &self,
        image: &DynamicImage,
        _source: &ProfileHandle,
        _destination: StandardProfile,
    ) -> Result<DynamicImage, ColorError> {
        self.transforms.fetch_add(1, Ordering::SeqCst);
        if self.fail_transform {
            return Err(ColorError::Transform("mock transform failure".into()));
        }
        Ok(image.clone())
    }
}
