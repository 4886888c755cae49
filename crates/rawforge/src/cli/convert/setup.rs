//! Engine setup: preset selection, flag overrides, input collection.

use rawforge_core::{Config, ConversionConfig, ConversionEngine};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::ConvertArgs;

/// Apply the preset and every explicit flag on top of it.
pub fn build_conversion_config(
    args: &ConvertArgs,
    config: &Config,
) -> anyhow::Result<ConversionConfig> {
    let mut conversion = args.preset.base(config);

    if let Some(quality) = args.quality {
        if !(1..=100).contains(&quality) {
            anyhow::bail!("JPEG quality must be between 1 and 100, got {quality}");
        }
        conversion.output.jpeg_quality = quality;
    }
    if let Some(white_balance) = args.white_balance {
        conversion.decode.white_balance = white_balance.into();
    }
    if args.half_size {
        conversion.decode.half_size = true;
    }
    if let Some(exposure) = args.exposure {
        if !(-8.0..=8.0).contains(&exposure) {
            anyhow::bail!("Exposure shift must be between -8 and 8 stops, got {exposure}");
        }
        conversion.decode.exposure_shift = exposure;
    }
    if args.no_recursive {
        conversion.recursive = false;
    }

    let color = &mut conversion.color;
    if args.no_color {
        color.enabled = false;
    }
    if let Some(brand) = &args.brand {
        color.brand = brand.clone();
    }
    if let Some(model) = &args.model {
        color.model = model.clone();
    }
    if args.brand.is_some() && args.model.is_some() {
        color.auto_detect = false;
    }
    if let Some(scene) = &args.scene {
        color.scene = scene.clone();
    }
    if let Some(profile) = &args.profile {
        let profile = expand(profile);
        if !profile.is_file() {
            anyhow::bail!(
                "Profile file does not exist: {:?}\n\n  Hint: Pass an .icc/.icm file, or drop --profile to use the profile directory.",
                profile
            );
        }
        color.profile_path = Some(profile);
    }
    if args.lenient {
        color.strict = false;
    }

    Ok(conversion)
}

/// Build the engine and index the profile directory up front.
pub fn setup_engine(
    args: &ConvertArgs,
    config: &Config,
    conversion: ConversionConfig,
) -> anyhow::Result<ConversionEngine> {
    let profile_dir = args
        .profile_dir
        .as_deref()
        .map(expand)
        .unwrap_or_else(|| config.profile_dir());

    let color_enabled = conversion.color.enabled;
    let engine = ConversionEngine::new(conversion, &profile_dir);

    let environment = engine.planner().check_environment();
    if !environment.is_ok() {
        tracing::warn!(
            "System below the recommended minimum ({:.1} GB memory, {} cores); conversions may fail or be slow",
            engine.planner().resources().total_memory_gb(),
            engine.planner().resources().cpu_cores
        );
    }

    if color_enabled {
        let stats = engine.catalog().scan()?;
        tracing::info!(
            "Indexed {} profiles ({} brands, {} models) from {:?}",
            stats.profiles,
            stats.brands,
            stats.models,
            profile_dir
        );
        if stats.profiles == 0 && engine.config().color.profile_path.is_none() {
            tracing::warn!(
                "No color profiles found in {:?}; use --profile-dir, --no-color or --lenient",
                profile_dir
            );
        }
    }

    Ok(engine)
}

/// Expand every input into supported files, keeping argument order and
/// dropping repeats.
pub fn collect_inputs(engine: &ConversionEngine, args: &ConvertArgs) -> anyhow::Result<Vec<PathBuf>> {
    let recursive = engine.config().recursive;
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in &args.inputs {
        let input = expand(input);
        if !input.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                input
            );
        }

        let found = if input.is_dir() {
            engine.scan_input_files(&input, recursive)?
        } else if is_accepted(engine, &input) {
            vec![input]
        } else {
            tracing::warn!("Skipping unsupported file: {:?}", input);
            continue;
        };

        files.extend(found.into_iter().filter(|path| seen.insert(path.clone())));
    }

    Ok(files)
}

fn is_accepted(engine: &ConversionEngine, path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| engine.config().accepts_extension(ext))
        .unwrap_or(false)
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rawforge_core::config::WhiteBalance;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn parse(argv: &[&str]) -> ConvertArgs {
        TestCli::parse_from(std::iter::once("rawforge").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_defaults_follow_config_file() {
        let mut config = Config::default();
        config.output.jpeg_quality = 80;

        let conversion = build_conversion_config(&parse(&["in", "-o", "out"]), &config).unwrap();
        assert_eq!(conversion.output.jpeg_quality, 80);
        assert!(conversion.color.strict);
        assert!(conversion.color.auto_detect);
    }

    #[test]
    fn test_flags_override_preset() {
        let args = parse(&[
            "in",
            "-o",
            "out",
            "--preset",
            "fast",
            "--quality",
            "70",
            "--white-balance",
            "camera",
            "--exposure",
            "-1.5",
            "--no-recursive",
        ]);
        let conversion = build_conversion_config(&args, &Config::default()).unwrap();

        assert_eq!(conversion.output.jpeg_quality, 70);
        assert_eq!(conversion.decode.white_balance, WhiteBalance::Camera);
        assert_eq!(conversion.decode.exposure_shift, -1.5);
        assert!(conversion.decode.half_size);
        assert!(!conversion.recursive);
        assert!(!conversion.color.enabled);
    }

    #[test]
    fn test_brand_and_model_pin_the_profile() {
        let args = parse(&["in", "-o", "out", "--brand", "Nikon", "--model", "D850", "--lenient"]);
        let conversion = build_conversion_config(&args, &Config::default()).unwrap();

        assert!(!conversion.color.auto_detect);
        assert!(!conversion.color.strict);
        assert_eq!(conversion.color.brand, "Nikon");
        assert_eq!(conversion.color.model, "D850");
    }

    #[test]
    fn test_brand_alone_keeps_detection() {
        let args = parse(&["in", "-o", "out", "--brand", "Canon"]);
        let conversion = build_conversion_config(&args, &Config::default()).unwrap();
        assert!(conversion.color.auto_detect);
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let args = parse(&["in", "-o", "out", "--quality", "0"]);
        assert!(build_conversion_config(&args, &Config::default()).is_err());
    }

    #[test]
    fn test_missing_profile_rejected() {
        let args = parse(&["in", "-o", "out", "--profile", "/nonexistent/custom.icc"]);
        let err = build_conversion_config(&args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("Profile file does not exist"));
    }

    #[test]
    fn test_collect_inputs_dedups_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("DSC_0001.NEF");
        std::fs::write(&raw, b"raw").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();

        let dir_arg = dir.path().to_str().unwrap();
        let raw_arg = raw.to_str().unwrap();
        let notes = dir.path().join("notes.txt");
        let args = parse(&[dir_arg, raw_arg, notes.to_str().unwrap(), "-o", "out", "--no-color"]);

        let conversion = build_conversion_config(&args, &Config::default()).unwrap();
        let engine = ConversionEngine::new(conversion, dir.path());
        let files = collect_inputs(&engine, &args).unwrap();
        assert_eq!(files, vec![raw]);
    }

    #[test]
    fn test_collect_inputs_missing_path() {
        let args = parse(&["/nonexistent/raws", "-o", "out"]);
        let engine = ConversionEngine::new(ConversionConfig::standard(), "/nonexistent/profiles");
        assert!(collect_inputs(&engine, &args).is_err());
    }
}
