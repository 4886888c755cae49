//! RawForge CLI - batch RAW to JPEG conversion with camera color profiles.
//!
//! Each RAW file's camera is identified from its metadata, the matching
//! `<Brand><Model>-<Scene>.icm` profile is looked up in the profile
//! directory, and the developed image is written as a color-corrected JPEG.
//!
//! # Usage
//!
//! ```bash
//! # Convert a directory
//! rawforge convert ./raw -o ./jpeg
//!
//! # Pin one profile for the whole batch
//! rawforge convert ./raw -o ./jpeg --brand Nikon --model D850 --scene Vivid
//!
//! # Inspect the profile directory
//! rawforge profiles list
//!
//! # See how a file's camera is identified
//! rawforge detect DSC_0001.NEF
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// RawForge - batch RAW to JPEG conversion with camera color profiles.
#[derive(Parser, Debug)]
#[command(name = "rawforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert RAW files to color-corrected JPEGs
    Convert(cli::convert::ConvertArgs),

    /// Inspect the color-profile directory
    Profiles(cli::profiles::ProfilesArgs),

    /// Show the camera identified for each file
    Detect(cli::detect::DetectArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln
    let config = match rawforge_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `rawforge config path`."
            );
            rawforge_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("RawForge v{}", rawforge_core::VERSION);

    match cli.command {
        Commands::Convert(args) => cli::convert::execute(args, config).await,
        Commands::Profiles(args) => cli::profiles::execute(args, &config),
        Commands::Detect(args) => cli::detect::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
