//! CLI enum types for the convert command: preset and white balance.

use clap::ValueEnum;
use rawforge_core::config::WhiteBalance;
use rawforge_core::ConversionConfig;

/// Starting point for the run settings.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum Preset {
    /// Settings from the config file (default)
    #[default]
    Config,
    /// Built-in balanced defaults
    Standard,
    /// Half-size, auto white balance, no color correction
    Fast,
    /// 16-bit development, quality 98, single worker
    High,
}

impl Preset {
    /// Base settings before per-flag overrides.
    pub fn base(self, config: &rawforge_core::Config) -> ConversionConfig {
        match self {
            Preset::Config => config.conversion(),
            Preset::Standard => ConversionConfig::standard(),
            Preset::Fast => ConversionConfig::fast(),
            Preset::High => ConversionConfig::high_quality(),
        }
    }
}

/// White balance source.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum WhiteBalanceArg {
    /// As shot, from the camera
    Camera,
    /// Estimated from the image
    Auto,
    /// Unscaled sensor response
    None,
}

impl From<WhiteBalanceArg> for WhiteBalance {
    fn from(arg: WhiteBalanceArg) -> Self {
        match arg {
            WhiteBalanceArg::Camera => WhiteBalance::Camera,
            WhiteBalanceArg::Auto => WhiteBalance::Auto,
            WhiteBalanceArg::None => WhiteBalance::None,
        }
    }
}
