//! Worker sizing and batch estimates.
//!
//! Everything here is advisory: the numbers size the worker pool and are
//! shown to the user, but never decide whether a file gets converted.

use serde::Serialize;
use std::path::PathBuf;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Upper bound on automatically sized pools; RAW development is memory-bound.
pub const MAX_AUTO_WORKERS: usize = 4;

/// Number of files whose sizes are sampled for an estimate.
pub const ESTIMATE_SAMPLE: usize = 5;

/// Seconds of work per MB of input.
const SECONDS_PER_MB: f64 = 1.0;

/// Working-set multiplier over input size.
const MEMORY_MULTIPLIER: f64 = 3.0;

/// Share of currently available memory a run may plan for.
const MEMORY_BUDGET: f64 = 0.7;

/// Snapshot of the machine the batch runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemResources {
    pub cpu_cores: usize,
    pub total_memory_bytes: u64,
    pub available_memory_bytes: u64,
}

impl SystemResources {
    /// Probe the current machine.
    pub fn detect() -> Self {
        let cpu_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let mut system = sysinfo::System::new();
        system.refresh_memory();

        let resources = Self {
            cpu_cores,
            total_memory_bytes: system.total_memory(),
            available_memory_bytes: system.available_memory(),
        };
        tracing::debug!(
            "System: {} cores, {:.1} GB total, {:.1} GB available",
            resources.cpu_cores,
            resources.total_memory_gb(),
            resources.available_memory_bytes as f64 / BYTES_PER_GB
        );
        resources
    }

    pub fn total_memory_gb(&self) -> f64 {
        self.total_memory_bytes as f64 / BYTES_PER_GB
    }
}

/// Estimated cost of converting a set of files.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BatchEstimate {
    pub seconds: f64,
    pub memory_mb: f64,
}

/// Result of a pre-flight environment check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentReport {
    /// At least 2 GB of physical memory
    pub memory_sufficient: bool,
    /// At least one core reported
    pub cores_available: bool,
}

impl EnvironmentReport {
    pub fn is_ok(&self) -> bool {
        self.memory_sufficient && self.cores_available
    }
}

/// Sizes worker pools and estimates batches from [`SystemResources`].
#[derive(Debug, Clone, Copy)]
pub struct ConversionPlanner {
    resources: SystemResources,
}

impl Default for ConversionPlanner {
    fn default() -> Self {
        Self::new(SystemResources::detect())
    }
}

impl ConversionPlanner {
    pub fn new(resources: SystemResources) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &SystemResources {
        &self.resources
    }

    /// Worker count for a run.
    ///
    /// An explicit cap is bounded by the core count only. Without one, one
    /// worker per 2 GB of memory, within `[1, cores]` and never above
    /// [`MAX_AUTO_WORKERS`].
    pub fn recommended_workers(&self, max_threads: Option<usize>) -> usize {
        let cores = self.resources.cpu_cores.max(1);
        match max_threads {
            Some(cap) => cap.min(cores).max(1),
            None => {
                let by_memory = (self.resources.total_memory_gb() / 2.0).floor() as usize;
                by_memory.clamp(1, cores).min(MAX_AUTO_WORKERS)
            }
        }
    }

    /// Memory a run may plan for, in MB.
    pub fn memory_limit_mb(&self) -> f64 {
        (self.resources.available_memory_bytes as f64 * MEMORY_BUDGET / BYTES_PER_MB).floor()
    }

    /// Estimate time and memory for `files` from the sizes of the first few.
    ///
    /// Missing files contribute zero bytes to the sample.
    pub fn estimate(&self, files: &[PathBuf]) -> BatchEstimate {
        if files.is_empty() {
            return BatchEstimate::default();
        }

        let sample = files.len().min(ESTIMATE_SAMPLE);
        let sampled_bytes: u64 = files[..sample]
            .iter()
            .filter_map(|path| std::fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum();

        let average = sampled_bytes as f64 / sample as f64;
        let total_mb = average * files.len() as f64 / BYTES_PER_MB;

        BatchEstimate {
            seconds: total_mb * SECONDS_PER_MB,
            memory_mb: (total_mb * MEMORY_MULTIPLIER).min(self.memory_limit_mb()),
        }
    }

    /// Check the machine meets the minimum for RAW development.
    pub fn check_environment(&self) -> EnvironmentReport {
        EnvironmentReport {
            memory_sufficient: self.resources.total_memory_gb() >= 2.0,
            cores_available: self.resources.cpu_cores >= 1,
        }
    }
}
