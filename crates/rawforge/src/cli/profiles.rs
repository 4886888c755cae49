//! The `rawforge profiles` command for inspecting the profile directory.

use clap::{Args, Subcommand};
use rawforge_core::{Config, LcmsColorManager, ProfileCatalog};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `profiles` command.
#[derive(Args, Debug)]
pub struct ProfilesArgs {
    /// Profile directory (overrides the config file)
    #[arg(long, global = true, env = "RAWFORGE_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ProfilesCommand,
}

/// Subcommands for profile inspection.
#[derive(Subcommand, Debug)]
pub enum ProfilesCommand {
    /// List brands, models and scenes
    List {
        /// Only show this brand
        #[arg(long)]
        brand: Option<String>,
    },

    /// Show which file a camera and scene resolve to
    Resolve {
        brand: String,
        model: String,
        #[arg(default_value = "Generic")]
        scene: String,
    },

    /// Show catalog counts
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute the profiles command.
pub fn execute(args: ProfilesArgs, config: &Config) -> anyhow::Result<()> {
    let directory = args
        .profile_dir
        .map(|dir| PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).into_owned()))
        .unwrap_or_else(|| config.profile_dir());

    let catalog = ProfileCatalog::new(&directory, Arc::new(LcmsColorManager::new()));
    let stats = catalog.scan()?;
    tracing::debug!("Scanned {:?}: {:?}", directory, stats);

    match args.command {
        ProfilesCommand::List { brand } => {
            if stats.profiles == 0 {
                eprintln!("No profiles found in {}", directory.display());
                return Ok(());
            }
            for b in catalog.brands() {
                if brand.as_deref().is_some_and(|want| !want.eq_ignore_ascii_case(&b)) {
                    continue;
                }
                println!("{b}");
                for model in catalog.models_for(&b) {
                    let scenes = catalog.scenes_for(&b, &model);
                    println!("  {model}: {}", scenes.join(", "));
                }
            }
        }

        ProfilesCommand::Resolve {
            brand,
            model,
            scene,
        } => match catalog.resolve(&brand, &model, &scene) {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!(
                "No profile for {brand} {model} ({scene}) in {}\n\n  Hint: Run `rawforge profiles list` to see what is available.",
                directory.display()
            ),
        },

        ProfilesCommand::Stats { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Directory:  {}", directory.display());
                println!("Brands:     {}", stats.brands);
                println!("Models:     {}", stats.models);
                println!("Scenes:     {}", stats.scenes);
                println!("Profiles:   {}", stats.profiles);
                if stats.duplicates > 0 {
                    println!("Duplicates: {}", stats.duplicates);
                }
                if stats.ignored > 0 {
                    println!("Ignored:    {}", stats.ignored);
                }
            }
        }
    }

    Ok(())
}
