//! Immutable per-run conversion settings and their presets.

use std::path::PathBuf;

use super::{ColorConfig, Config, DecodeConfig, OutputConfig, WhiteBalance};

/// Settings every worker of a batch reads. Built once per run and never
/// mutated while files are in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    pub decode: DecodeConfig,
    pub output: OutputConfig,
    pub color: ColorConfig,

    /// Explicit worker cap (None = derived from the machine)
    pub max_threads: Option<usize>,

    /// Descend into subdirectories when an input is a directory
    pub recursive: bool,

    /// Accepted input extensions, lowercase without the dot
    pub supported_formats: Vec<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConversionConfig {
    /// Derive run settings from the loaded configuration file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            decode: config.decode.clone(),
            output: config.output.clone(),
            color: config.color.clone(),
            max_threads: config.processing.max_threads,
            recursive: config.processing.recursive,
            supported_formats: config
                .processing
                .supported_formats
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Balanced defaults: camera white balance, 8-bit, quality 95.
    pub fn standard() -> Self {
        Self::from_config(&Config::default())
    }

    /// Fastest development: half-size, auto white balance, quality 85,
    /// four workers and no color correction.
    pub fn fast() -> Self {
        let mut config = Self::standard();
        config.decode.white_balance = WhiteBalance::Auto;
        config.decode.half_size = true;
        config.decode.auto_brightness = false;
        config.decode.preserve_highlights = false;
        config.output.jpeg_quality = 85;
        config.color.enabled = false;
        config.max_threads = Some(4);
        config
    }

    /// Full-size 8-bit development at quality 98 on a single worker,
    /// corrected with the ProStandard scene.
    pub fn high_quality() -> Self {
        let mut config = Self::standard();
        config.decode.output_bits = 8;
        config.decode.white_balance = WhiteBalance::Camera;
        config.decode.brightness = 1.0;
        config.decode.auto_brightness = true;
        config.decode.half_size = false;
        config.decode.preserve_highlights = true;
        config.output.jpeg_quality = 98;
        config.color.strict = true;
        config.color.scene = "ProStandard".to_string();
        config.max_threads = Some(1);
        config
    }

    /// Standard settings with a configured camera and scene. Detection
    /// stays on and only fills whichever of brand or model is left empty.
    pub fn with_profile(
        brand: impl Into<String>,
        model: impl Into<String>,
        scene: impl Into<String>,
    ) -> Self {
        let mut config = Self::standard();
        config.color.brand = brand.into();
        config.color.model = model.into();
        config.color.scene = scene.into();
        config
    }

    /// Use an explicit ICC file for every file in the run.
    pub fn with_profile_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.color.profile_path = Some(path.into());
        self
    }

    /// Disable color correction entirely.
    pub fn without_color(mut self) -> Self {
        self.color.enabled = false;
        self
    }

    pub fn with_white_balance(mut self, white_balance: WhiteBalance) -> Self {
        self.decode.white_balance = white_balance;
        self
    }

    /// Whether `ext` (no dot, any case) is an accepted input extension.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.supported_formats.iter().any(|f| *f == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_where_expected() {
        let standard = ConversionConfig::standard();
        let fast = ConversionConfig::fast();
        let hq = ConversionConfig::high_quality();

        assert_eq!(standard.output.jpeg_quality, 95);
        assert_eq!(standard.decode.output_bits, 8);
        assert!(fast.decode.half_size);
        assert!(fast.output.jpeg_quality < standard.output.jpeg_quality);
        assert!(!fast.color.enabled);
        assert_eq!(fast.decode.white_balance, WhiteBalance::Auto);
        assert_eq!(fast.max_threads, Some(4));
        assert_eq!(hq.decode.output_bits, 8);
        assert!(hq.decode.auto_brightness);
        assert!(!hq.decode.half_size);
        assert!(hq.output.jpeg_quality > standard.output.jpeg_quality);
        assert_eq!(hq.max_threads, Some(1));
        assert_eq!(hq.color.scene, "ProStandard");
    }

    #[test]
    fn test_with_profile_configures_camera() {
        let config = ConversionConfig::with_profile("Nikon", "D850", "Vivid");
        assert!(config.color.auto_detect);
        assert!(config.color.enabled);
        assert_eq!(config.color.brand, "Nikon");
        assert_eq!(config.color.model, "D850");
        assert_eq!(config.color.scene, "Vivid");
    }

    #[test]
    fn test_builders_chain() {
        let config = ConversionConfig::standard()
            .with_white_balance(WhiteBalance::None)
            .with_profile_path("/profiles/custom.icc")
            .without_color();
        assert_eq!(config.decode.white_balance, WhiteBalance::None);
        assert_eq!(
            config.color.profile_path.as_deref(),
            Some(std::path::Path::new("/profiles/custom.icc"))
        );
        assert!(!config.color.enabled);
    }

    #[test]
    fn test_from_config_normalizes_formats() {
        let mut file_config = Config::default();
        file_config.processing.supported_formats = vec![".NEF".into(), "cr3".into()];
        file_config.processing.max_threads = Some(3);

        let config = ConversionConfig::from_config(&file_config);
        assert_eq!(config.max_threads, Some(3));
        assert!(config.accepts_extension("nef"));
        assert!(config.accepts_extension("CR3"));
        assert!(!config.accepts_extension("jpg"));
    }
}
