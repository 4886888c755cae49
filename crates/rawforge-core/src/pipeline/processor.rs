//! Single-file conversion: skip check, identify, decode, correct, encode.

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::camera::CameraIdentifier;
use crate::catalog::ProfileCatalog;
use crate::color::{ColorManager, StandardProfile};
use crate::config::ConversionConfig;
use crate::error::{ConversionError, ConversionOutcome};
use crate::types::{ConversionResult, ConversionStatus, NormalizedCamera, UNKNOWN_MODEL};

use super::decode::ImageCodec;

/// Converts one input file into one JPEG.
///
/// Shared read-only by every worker of a batch. Every outcome, including
/// failures, comes back as a [`ConversionResult`].
pub struct FileConverter {
    config: ConversionConfig,
    codec: Arc<dyn ImageCodec>,
    color: Arc<dyn ColorManager>,
    catalog: Arc<ProfileCatalog>,
    identifier: Arc<CameraIdentifier>,
}

impl FileConverter {
    pub fn new(
        config: ConversionConfig,
        codec: Arc<dyn ImageCodec>,
        color: Arc<dyn ColorManager>,
        catalog: Arc<ProfileCatalog>,
        identifier: Arc<CameraIdentifier>,
    ) -> Self {
        Self {
            config,
            codec,
            color,
            catalog,
            identifier,
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Convert `input` to `output`.
    pub fn convert(&self, input: &Path, output: &Path) -> ConversionResult {
        let start = Instant::now();
        let mut result = ConversionResult::pending(input, output);
        result.started_at = SystemTime::now();
        result.status = ConversionStatus::Processing;
        result.input_size = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0);
        tracing::debug!("Converting {:?} -> {:?}", input, output);

        match self.run(input, output, &mut result) {
            Ok(()) => {
                result.status = ConversionStatus::Completed;
                result.output_size = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
            }
            Err(ConversionError::OutputExists(path)) => {
                tracing::debug!("Skipping {:?}: {:?} already exists", input, path);
                result.status = ConversionStatus::Skipped;
                result.error_message = Some("output already exists".to_string());
            }
            Err(e) => {
                tracing::error!("Failed to convert {:?}: {}", input, e);
                result.status = ConversionStatus::Failed;
                result.error_message = Some(e.to_string());
            }
        }

        result.finished_at = SystemTime::now();
        result.processing_seconds = start.elapsed().as_secs_f64();
        tracing::debug!(
            "{} in {:.2}s",
            result.status_line(),
            result.processing_seconds
        );
        result
    }

    fn run(
        &self,
        input: &Path,
        output: &Path,
        result: &mut ConversionResult,
    ) -> ConversionOutcome<()> {
        if output.exists() {
            return Err(ConversionError::OutputExists(output.to_path_buf()));
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConversionError::OutputPrepare {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let color = &self.config.color;
        let camera = if color.enabled && color.auto_detect {
            self.identifier.identify(self.codec.as_ref(), input)
        } else {
            None
        };
        if let Some(camera) = &camera {
            result.detected_brand = camera.known_brand().map(str::to_string);
            result.detected_model = camera.known_model().map(str::to_string);
        }

        let image = self
            .codec
            .decode(input, &self.config.decode)
            .map_err(|e| ConversionError::DecodeFailed {
                path: input.to_path_buf(),
                message: e.to_string(),
            })?;

        let image = if color.enabled {
            match self.correct(&image, camera.as_ref(), result) {
                Ok(corrected) => {
                    result.profile_applied = true;
                    corrected
                }
                Err(e) if color.strict || !e.is_color_correction() => return Err(e),
                Err(e) => {
                    tracing::warn!("{:?}: continuing without color correction: {}", input, e);
                    result.warning = Some(e.to_string());
                    image
                }
            }
        } else {
            image
        };

        self.codec
            .encode(output, &image, self.config.output.jpeg_quality)
            .map_err(|e| ConversionError::EncodeFailed {
                path: output.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Resolve, load and apply a profile.
    fn correct(
        &self,
        image: &DynamicImage,
        camera: Option<&NormalizedCamera>,
        result: &mut ConversionResult,
    ) -> ConversionOutcome<DynamicImage> {
        let path = self.resolve_profile(camera)?;
        result.profile_path = Some(path.clone());

        let handle = self
            .catalog
            .load(&path)
            .ok_or_else(|| ConversionError::ProfileLoadFailed {
                path: path.clone(),
                message: "profile could not be opened".to_string(),
            })?;

        self.color
            .transform(image, &handle, StandardProfile::Srgb)
            .map_err(|e| ConversionError::ColorTransformFailed {
                profile: path,
                message: e.to_string(),
            })
    }

    /// Pick the profile for a file.
    ///
    /// An existing manual profile path wins. Otherwise configured brand and
    /// model are looked up with the configured scene, with the detected
    /// camera filling in whichever of the two is left empty.
    pub fn resolve_profile(&self, camera: Option<&NormalizedCamera>) -> ConversionOutcome<PathBuf> {
        let color = &self.config.color;

        if let Some(manual) = &color.profile_path {
            if manual.is_file() {
                return Ok(manual.clone());
            }
            tracing::warn!(
                "Manual profile {:?} does not exist, falling back to catalog lookup",
                manual
            );
        }

        let configured = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        let brand = configured(&color.brand)
            .or_else(|| camera.and_then(|c| c.known_brand()).map(str::to_string));
        let model = configured(&color.model)
            .or_else(|| camera.and_then(|c| c.known_model()).map(str::to_string));

        let not_found = |brand: Option<&str>, model: Option<&str>| ConversionError::ProfileNotFound {
            brand: brand.unwrap_or("Unknown").to_string(),
            model: model.unwrap_or(UNKNOWN_MODEL).to_string(),
            scene: color.scene.clone(),
        };

        match (brand.as_deref(), model.as_deref()) {
            (Some(brand), Some(model)) => self
                .catalog
                .resolve(brand, model, &color.scene)
                .ok_or_else(|| not_found(Some(brand), Some(model))),
            (brand, model) => Err(not_found(brand, model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCodec, MockColorManager, MOCK_JPEG};

    struct Fixture {
        _dir: tempfile::TempDir,
        input: PathBuf,
        output: PathBuf,
        profiles: PathBuf,
        codec: Arc<MockCodec>,
    }

    fn fixture(input_name: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in").join(input_name);
        std::fs::create_dir_all(input.parent().unwrap()).unwrap();
        std::fs::write(&input, b"raw sensor data").unwrap();
        let profiles = dir.path().join("profiles");
        std::fs::create_dir_all(&profiles).unwrap();

        let codec = Arc::new(
            MockCodec::new().with_metadata("DSC_0001.NEF", "NIKON CORPORATION", "NIKON D850"),
        );
        Fixture {
            output: dir.path().join("out/nested/DSC_0001.jpg"),
            input,
            profiles,
            codec,
            _dir: dir,
        }
    }

    fn converter(fx: &Fixture, config: ConversionConfig, color: Arc<MockColorManager>) -> FileConverter {
        let catalog = Arc::new(ProfileCatalog::new(&fx.profiles, color.clone()));
        FileConverter::new(
            config,
            fx.codec.clone(),
            color,
            catalog,
            Arc::new(CameraIdentifier::new()),
        )
    }

    #[test]
    fn test_completed_without_color() {
        let fx = fixture("DSC_0001.NEF");
        let conv = converter(
            &fx,
            ConversionConfig::standard().without_color(),
            Arc::new(MockColorManager::new()),
        );

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Completed);
        assert!(fx.output.exists());
        assert!(!result.profile_applied);
        assert_eq!(result.output_size, MOCK_JPEG.len() as u64);
        assert_eq!(result.input_size, 15);
        assert!(result.error_message.is_none());
        assert!(result.finished_at >= result.started_at);
    }

    #[test]
    fn test_existing_output_is_skipped_without_decoding() {
        let fx = fixture("DSC_0001.NEF");
        std::fs::create_dir_all(fx.output.parent().unwrap()).unwrap();
        std::fs::write(&fx.output, b"previous run").unwrap();
        let conv = converter(&fx, ConversionConfig::standard(), Arc::new(MockColorManager::new()));

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Skipped);
        assert_eq!(fx.codec.decode_count(), 0);
        assert_eq!(fx.codec.encode_count(), 0);
        assert_eq!(std::fs::read(&fx.output).unwrap(), b"previous run");
    }

    #[test]
    fn test_decode_failure_fails_file() {
        let fx = fixture("corrupt_0002.NEF");
        let conv = converter(
            &fx,
            ConversionConfig::standard().without_color(),
            Arc::new(MockColorManager::new()),
        );

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Failed);
        assert!(result.error_message.unwrap().starts_with("Decode error"));
        assert!(!fx.output.exists());
    }

    #[test]
    fn test_encode_failure_fails_file() {
        let fx = fixture("DSC_0001.NEF");
        let conv = converter(
            &fx,
            ConversionConfig::standard().without_color(),
            Arc::new(MockColorManager::new()),
        );
        let output = fx.output.with_file_name("unwritable.jpg");

        let result = conv.convert(&fx.input, &output);
        assert_eq!(result.status, ConversionStatus::Failed);
        assert!(result.error_message.unwrap().starts_with("Encode error"));
    }

    #[test]
    fn test_unpreparable_output_directory_fails() {
        let fx = fixture("DSC_0001.NEF");
        let blocker = fx.profiles.join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();
        let conv = converter(
            &fx,
            ConversionConfig::standard().without_color(),
            Arc::new(MockColorManager::new()),
        );

        let result = conv.convert(&fx.input, &blocker.join("out.jpg"));
        assert_eq!(result.status, ConversionStatus::Failed);
        assert!(result
            .error_message
            .unwrap()
            .starts_with("Cannot prepare output directory"));
        assert_eq!(fx.codec.decode_count(), 0);
    }

    #[test]
    fn test_strict_missing_profile_fails() {
        let fx = fixture("DSC_0001.NEF");
        let conv = converter(&fx, ConversionConfig::standard(), Arc::new(MockColorManager::new()));

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Failed);
        assert_eq!(
            result.error_message.as_deref(),
            Some("No color profile found for Nikon D850 (Generic)")
        );
        assert_eq!(result.detected_brand.as_deref(), Some("Nikon"));
        assert_eq!(result.detected_model.as_deref(), Some("D850"));
        assert!(!fx.output.exists());
    }

    #[test]
    fn test_lenient_missing_profile_completes_uncorrected() {
        let fx = fixture("DSC_0001.NEF");
        let mut config = ConversionConfig::standard();
        config.color.strict = false;
        let conv = converter(&fx, config, Arc::new(MockColorManager::new()));

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Completed);
        assert!(!result.profile_applied);
        assert!(result.error_message.is_none());
        assert!(result.warning.unwrap().contains("Nikon D850"));
        assert!(fx.output.exists());
    }

    #[test]
    fn test_detected_camera_profile_is_applied() {
        let fx = fixture("DSC_0001.NEF");
        let profile = fx.profiles.join("NikonD850-Generic.icm");
        std::fs::write(&profile, b"icc").unwrap();
        let color = Arc::new(MockColorManager::new());
        let conv = converter(&fx, ConversionConfig::standard(), color.clone());

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Completed);
        assert!(result.profile_applied);
        assert_eq!(result.profile_path, Some(profile));
        assert_eq!(color.transform_count(), 1);
    }

    #[test]
    fn test_configured_brand_combines_with_detected_model() {
        let fx = fixture("DSC_0001.NEF");
        let profile = fx.profiles.join("NikonD850-Vivid.icm");
        std::fs::write(&profile, b"icc").unwrap();
        let mut config = ConversionConfig::standard();
        config.color.brand = "Nikon".into();
        config.color.scene = "vivid".into();
        let conv = converter(&fx, config, Arc::new(MockColorManager::new()));

        let result = conv.convert(&fx.input, &fx.output);
        assert!(result.profile_applied);
        assert_eq!(result.profile_path, Some(profile));
    }

    #[test]
    fn test_configured_camera_needs_no_metadata() {
        let fx = fixture("IMG_0002.CR3");
        let profile = fx.profiles.join("CanonEOSR5-Generic.icm");
        std::fs::write(&profile, b"icc").unwrap();
        let conv = converter(
            &fx,
            ConversionConfig::with_profile("Canon", "EOS R5", "Generic"),
            Arc::new(MockColorManager::new()),
        );

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Completed);
        assert!(result.profile_applied);
        assert!(result.detected_brand.is_none());
    }

    #[test]
    fn test_manual_profile_path_takes_precedence() {
        let fx = fixture("DSC_0001.NEF");
        std::fs::write(fx.profiles.join("NikonD850-Generic.icm"), b"icc").unwrap();
        let manual = fx.profiles.join("custom.icc");
        std::fs::write(&manual, b"icc").unwrap();
        let conv = converter(
            &fx,
            ConversionConfig::standard().with_profile_path(&manual),
            Arc::new(MockColorManager::new()),
        );

        assert_eq!(conv.resolve_profile(None).unwrap(), manual);
        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.profile_path, Some(manual));
    }

    #[test]
    fn test_missing_manual_profile_falls_back_to_catalog() {
        let fx = fixture("DSC_0001.NEF");
        let catalog_profile = fx.profiles.join("NikonD850-Generic.icm");
        std::fs::write(&catalog_profile, b"icc").unwrap();
        let conv = converter(
            &fx,
            ConversionConfig::standard().with_profile_path(fx.profiles.join("gone.icc")),
            Arc::new(MockColorManager::new()),
        );

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.profile_path, Some(catalog_profile));
        assert!(result.profile_applied);
    }

    #[test]
    fn test_unloadable_profile_follows_strictness() {
        let fx = fixture("DSC_0001.NEF");
        std::fs::write(fx.profiles.join("NikonD850-Generic.icm"), b"bad header").unwrap();

        let strict = converter(&fx, ConversionConfig::standard(), Arc::new(MockColorManager::new()));
        let result = strict.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Failed);
        assert!(result
            .error_message
            .unwrap()
            .starts_with("Failed to load color profile"));

        let mut config = ConversionConfig::standard();
        config.color.strict = false;
        let lenient = converter(&fx, config, Arc::new(MockColorManager::new()));
        let result = lenient.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Completed);
        assert!(!result.profile_applied);
    }

    #[test]
    fn test_transform_failure_follows_strictness() {
        let fx = fixture("DSC_0001.NEF");
        std::fs::write(fx.profiles.join("NikonD850-Generic.icm"), b"icc").unwrap();

        let strict = converter(
            &fx,
            ConversionConfig::standard(),
            Arc::new(MockColorManager::failing_transform()),
        );
        let result = strict.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Failed);
        assert!(result.error_message.unwrap().contains("mock transform failure"));

        let mut config = ConversionConfig::standard();
        config.color.strict = false;
        let lenient = converter(&fx, config, Arc::new(MockColorManager::failing_transform()));
        let result = lenient.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Completed);
        assert!(!result.profile_applied);
        assert!(result.profile_path.is_some());
        assert!(result.warning.unwrap().starts_with("Color correction with"));
        assert!(result.error_message.is_none());
    }

    #[test]
    fn test_unknown_camera_reports_unknown_parts() {
        let fx = fixture("no_metadata.NEF");
        let conv = converter(&fx, ConversionConfig::standard(), Arc::new(MockColorManager::new()));

        let result = conv.convert(&fx.input, &fx.output);
        assert_eq!(result.status, ConversionStatus::Failed);
        assert_eq!(
            result.error_message.as_deref(),
            Some("No color profile found for Unknown Unknown (Generic)")
        );
    }
}
