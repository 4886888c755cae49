//! Per-run aggregate statistics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::{ConversionResult, ConversionStatus};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Accumulator folded from a run's results on the collecting side only.
#[derive(Debug, Clone, Default)]
pub struct ConversionMetrics {
    total: usize,
    completed: usize,
    failed: usize,
    skipped: usize,
    cancelled: usize,

    /// Sizes and times of completed files only
    input_bytes: u64,
    output_bytes: u64,
    processing_seconds: f64,

    wall_time: Duration,
}

impl ConversionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result in.
    pub fn record(&mut self, result: &ConversionResult) {
        self.total += 1;
        match result.status {
            ConversionStatus::Completed => {
                self.completed += 1;
                self.input_bytes += result.input_size;
                self.output_bytes += result.output_size;
                self.processing_seconds += result.processing_seconds;
            }
            ConversionStatus::Failed => self.failed += 1,
            ConversionStatus::Skipped => self.skipped += 1,
            ConversionStatus::Pending | ConversionStatus::Processing => self.cancelled += 1,
        }
    }

    /// Record the wall-clock duration of the run.
    pub fn finish(&mut self, elapsed: Duration) {
        self.wall_time = elapsed;
    }

    pub fn summary(&self) -> MetricsSummary {
        let input_mb = self.input_bytes as f64 / BYTES_PER_MB;
        let output_mb = self.output_bytes as f64 / BYTES_PER_MB;

        let avg_time_per_file = if self.completed > 0 {
            self.processing_seconds / self.completed as f64
        } else {
            0.0
        };
        let conversion_rate_mbps = if input_mb > 0.0 && self.processing_seconds > 0.0 {
            input_mb / self.processing_seconds
        } else {
            0.0
        };
        let size_reduction_percent = if self.input_bytes > 0 {
            (1.0 - self.output_bytes as f64 / self.input_bytes as f64) * 100.0
        } else {
            0.0
        };
        let success_rate = if self.total > 0 {
            self.completed as f64 / self.total as f64 * 100.0
        } else {
            0.0
        };

        MetricsSummary {
            total_files: self.total,
            completed: self.completed,
            failed: self.failed,
            skipped: self.skipped,
            cancelled: self.cancelled,
            success_rate,
            total_time: self.wall_time.as_secs_f64(),
            avg_time_per_file,
            conversion_rate_mbps,
            size_reduction_percent,
            total_input_mb: input_mb,
            total_output_mb: output_mb,
        }
    }
}

impl<'a> FromIterator<&'a ConversionResult> for ConversionMetrics {
    fn from_iter<I: IntoIterator<Item = &'a ConversionResult>>(iter: I) -> Self {
        let mut metrics = Self::new();
        for result in iter {
            metrics.record(result);
        }
        metrics
    }
}

/// Finalized view of [`ConversionMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_files: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Files never started because the run was stopped
    pub cancelled: usize,
    /// Completed share of all files, in percent
    pub success_rate: f64,
    /// Wall-clock seconds for the run
    pub total_time: f64,
    pub avg_time_per_file: f64,
    /// Input MB per second of processing time
    pub conversion_rate_mbps: f64,
    /// How much smaller outputs are than inputs, in percent
    pub size_reduction_percent: f64,
    pub total_input_mb: f64,
    pub total_output_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn result(status: ConversionStatus, input: u64, output: u64, seconds: f64) -> ConversionResult {
        let mut r = ConversionResult::pending(Path::new("a.nef"), Path::new("a.jpg"));
        r.status = status;
        r.input_size = input;
        r.output_size = output;
        r.processing_seconds = seconds;
        r
    }

    #[test]
    fn test_counts_add_up() {
        let results = [
            result(ConversionStatus::Completed, 0, 0, 0.0),
            result(ConversionStatus::Failed, 0, 0, 0.0),
            result(ConversionStatus::Skipped, 0, 0, 0.0),
            result(ConversionStatus::Pending, 0, 0, 0.0),
        ];
        let summary = results.iter().collect::<ConversionMetrics>().summary();

        assert_eq!(summary.total_files, 4);
        assert_eq!(
            summary.completed + summary.failed + summary.skipped + summary.cancelled,
            summary.total_files
        );
        assert_eq!(summary.success_rate, 25.0);
    }

    #[test]
    fn test_rates_use_completed_files_only() {
        let mb = 1024 * 1024;
        let results = [
            result(ConversionStatus::Completed, 20 * mb, 5 * mb, 2.0),
            result(ConversionStatus::Completed, 20 * mb, 5 * mb, 2.0),
            result(ConversionStatus::Failed, 100 * mb, 0, 9.0),
        ];
        let mut metrics: ConversionMetrics = results.iter().collect();
        metrics.finish(Duration::from_secs(3));
        let summary = metrics.summary();

        assert_eq!(summary.avg_time_per_file, 2.0);
        assert_eq!(summary.conversion_rate_mbps, 10.0);
        assert_eq!(summary.size_reduction_percent, 75.0);
        assert_eq!(summary.total_input_mb, 40.0);
        assert_eq!(summary.total_output_mb, 10.0);
        assert_eq!(summary.total_time, 3.0);
    }

    #[test]
    fn test_empty_summary_is_zero() {
        assert_eq!(ConversionMetrics::new().summary(), MetricsSummary::default());
    }
}
