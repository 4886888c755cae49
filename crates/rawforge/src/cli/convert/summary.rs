//! Progress bar and end-of-run reporting on stderr.

use console::Style;
use rawforge_core::{
    BatchEstimate, CatalogStats, ConversionResult, ConversionStatus, EnvironmentReport,
    MetricsSummary,
};
use std::path::Path;

/// Create a progress bar for a conversion run.
pub fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// List every failed file with its reason.
pub fn print_failures(results: &[ConversionResult]) {
    let red = Style::new().for_stderr().red();
    let failed: Vec<&ConversionResult> = results
        .iter()
        .filter(|r| r.status == ConversionStatus::Failed)
        .collect();
    if failed.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("  {}", red.apply_to(format!("{} failed:", failed.len())));
    for result in failed {
        eprintln!(
            "    {} {}",
            red.apply_to("✗"),
            result.status_line().trim_start_matches("failed: ")
        );
    }
}

/// Print a formatted summary table after a run.
pub fn print_summary(summary: &MetricsSummary, output_dir: &Path) {
    let green = Style::new().for_stderr().green();
    let yellow = Style::new().for_stderr().yellow();
    let red = Style::new().for_stderr().red();

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Completed:    {:>8}", green.apply_to(summary.completed));
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", red.apply_to(summary.failed));
    }
    if summary.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", yellow.apply_to(summary.skipped));
    }
    if summary.cancelled > 0 {
        eprintln!("    Cancelled:    {:>8}", yellow.apply_to(summary.cancelled));
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total_files);
    eprintln!("    Success:      {:>7.1}%", summary.success_rate);
    eprintln!("    Duration:     {:>7.1}s", summary.total_time);
    eprintln!("    Per file:     {:>7.2}s", summary.avg_time_per_file);
    eprintln!("    Throughput:   {:>7.1} MB/sec", summary.conversion_rate_mbps);
    if summary.total_input_mb > 0.0 {
        eprintln!(
            "    Size:         {:>7.1} MB -> {:.1} MB ({:.0}% smaller)",
            summary.total_input_mb, summary.total_output_mb, summary.size_reduction_percent
        );
    }
    eprintln!("  ====================================");
    eprintln!("    Output: {}", output_dir.display());
}

/// Print what a run would do without converting anything.
pub fn print_estimate(
    estimate: &BatchEstimate,
    files: usize,
    workers: usize,
    profiles: &CatalogStats,
    environment: &EnvironmentReport,
) {
    let cyan = Style::new().for_stderr().cyan();
    let green = Style::new().for_stderr().green();
    let red = Style::new().for_stderr().red();

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Dry run"));
    eprintln!("    Files:        {:>8}", files);
    eprintln!("    Workers:      {:>8}", workers);
    eprintln!("    Profiles:     {:>8}", profiles.profiles);
    eprintln!("    Est. time:    {:>7.0}s", estimate.seconds);
    eprintln!("    Est. memory:  {:>7.0} MB", estimate.memory_mb);
    if environment.is_ok() {
        eprintln!("    System:       {:>8}", green.apply_to("ok"));
    } else {
        eprintln!("    System:       {:>8}", red.apply_to("below 2 GB"));
    }
}
