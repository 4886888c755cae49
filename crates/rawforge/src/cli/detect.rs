//! The `rawforge detect` command: show how each file's camera is identified
//! and which profile it would use.

use clap::Args;
use rawforge_core::{
    CameraIdentifier, Config, FileDiscovery, ImageCodec, LcmsColorManager, ProfileCatalog,
    StandardCodec,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `detect` command.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// RAW files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Scene used for the profile lookup (default: config)
    #[arg(long)]
    pub scene: Option<String>,

    /// Profile directory (overrides the config file)
    #[arg(long, env = "RAWFORGE_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Print one JSON object per file
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Detection {
    file: PathBuf,
    make: Option<String>,
    model: Option<String>,
    brand: String,
    normalized_model: String,
    profile: Option<PathBuf>,
}

/// Execute the detect command.
pub fn execute(args: DetectArgs, config: &Config) -> anyhow::Result<()> {
    let conversion = config.conversion();
    let discovery = FileDiscovery::from_config(&conversion);
    let scene = args.scene.unwrap_or_else(|| conversion.color.scene.clone());

    let profile_dir = args
        .profile_dir
        .map(|dir| PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).into_owned()))
        .unwrap_or_else(|| config.profile_dir());
    let catalog = ProfileCatalog::new(profile_dir, Arc::new(LcmsColorManager::new()));
    let identifier = CameraIdentifier::new();
    let codec = StandardCodec::new();

    let mut files = Vec::new();
    for input in &args.inputs {
        files.extend(discovery.discover(input)?);
    }
    if files.is_empty() {
        tracing::warn!("No supported RAW files found in {:?}", args.inputs);
        return Ok(());
    }

    for file in files {
        let info = codec.read_camera_metadata(&file);
        let camera = info
            .as_ref()
            .map(|info| identifier.normalize(info))
            .unwrap_or_else(rawforge_core::NormalizedCamera::unknown);
        let profile = match (camera.known_brand(), camera.known_model()) {
            (Some(brand), Some(model)) => catalog.resolve(brand, model, &scene),
            _ => None,
        };

        let detection = Detection {
            make: info.as_ref().map(|i| i.make.clone()),
            model: info.map(|i| i.model),
            brand: camera.brand.to_string(),
            normalized_model: camera.model,
            profile,
            file,
        };

        if args.json {
            println!("{}", serde_json::to_string(&detection)?);
        } else {
            println!(
                "{}: {} {} [{}]",
                detection.file.display(),
                detection.brand,
                detection.normalized_model,
                detection
                    .profile
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("no {scene} profile"))
            );
        }
    }

    Ok(())
}
