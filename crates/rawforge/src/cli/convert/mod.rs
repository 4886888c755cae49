//! The `rawforge convert` command.

mod setup;
mod summary;
pub mod types;

pub use types::{Preset, WhiteBalanceArg};

use clap::Args;
use rawforge_core::{save_report, Config, ConversionStatus};
use std::path::PathBuf;
use std::sync::Arc;

use setup::{build_conversion_config, collect_inputs, setup_engine};
use summary::{create_progress_bar, print_estimate, print_failures, print_summary};

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// RAW files and/or directories to convert
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: PathBuf,

    /// Settings preset
    #[arg(long, value_enum, default_value = "config")]
    pub preset: Preset,

    /// Number of parallel workers (default: sized from memory and cores)
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Only convert the top level of input directories
    #[arg(long)]
    pub no_recursive: bool,

    /// JPEG quality (1-100)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// White balance source
    #[arg(long, value_enum)]
    pub white_balance: Option<WhiteBalanceArg>,

    /// Develop at half resolution
    #[arg(long)]
    pub half_size: bool,

    /// Exposure shift in stops
    #[arg(long, allow_hyphen_values = true)]
    pub exposure: Option<f32>,

    /// Disable color correction
    #[arg(long)]
    pub no_color: bool,

    /// Camera brand to use instead of the detected one
    #[arg(long)]
    pub brand: Option<String>,

    /// Camera model to use instead of the detected one
    #[arg(long)]
    pub model: Option<String>,

    /// Profile scene (e.g. Generic, Vivid, Portrait)
    #[arg(long)]
    pub scene: Option<String>,

    /// Explicit ICC/ICM profile applied to every file
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Profile directory (overrides the config file)
    #[arg(long, env = "RAWFORGE_PROFILE_DIR")]
    pub profile_dir: Option<PathBuf>,

    /// Convert uncorrected instead of failing when no profile can be applied
    #[arg(long)]
    pub lenient: bool,

    /// Write a JSON (or .jsonl) report of every result
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print the plan and estimates without converting
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: Config) -> anyhow::Result<()> {
    let conversion = build_conversion_config(&args, &config)?;
    let mut engine = setup_engine(&args, &config, conversion)?;

    let files = collect_inputs(&engine, &args)?;
    if files.is_empty() {
        tracing::warn!("No supported RAW files found in {:?}", args.inputs);
        return Ok(());
    }

    let workers = args
        .workers
        .unwrap_or_else(|| engine.recommended_workers());
    tracing::info!("Found {} file(s) to convert", files.len());

    if args.dry_run {
        let stats = engine.catalog().stats();
        let environment = engine.planner().check_environment();
        print_estimate(
            &engine.estimate(&files),
            files.len(),
            workers,
            &stats,
            &environment,
        );
        return Ok(());
    }

    let progress = create_progress_bar(files.len() as u64);
    {
        let progress = progress.clone();
        engine.set_progress_callback(move |done, _total| progress.set_position(done as u64));
    }
    {
        let progress = progress.clone();
        engine.set_status_callback(move |line| progress.set_message(line.to_string()));
    }

    let engine = Arc::new(engine);
    let ctrl_c = {
        let engine = engine.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted; finishing files already in progress");
                engine.stop();
            }
        })
    };

    let results = engine
        .convert_batch(&files, &args.output, Some(workers))
        .await;
    ctrl_c.abort();
    progress.finish_and_clear();

    let summary = engine.metrics_summary();
    print_failures(&results);
    print_summary(&summary, &args.output);

    if let Some(report) = &args.report {
        save_report(report, &summary, &results)?;
        eprintln!("  Report written to {}", report.display());
    }

    let failed = results
        .iter()
        .filter(|r| r.status == ConversionStatus::Failed)
        .count();
    if failed > 0 {
        anyhow::bail!("{failed} file(s) failed to convert");
    }
    Ok(())
}
