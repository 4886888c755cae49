//! Batch conversion engine.
//!
//! Runs one [`FileConverter`] job per input on a bounded pool of blocking
//! workers and collects results back into input order:
//!
//! ```text
//! inputs ─► output paths ─► Semaphore(workers) ─► spawn_blocking(convert)
//!                                                        │
//!             results[idx] ◄── collector ◄── mpsc ◄──────┘
//!                                  │
//!                       progress / status callbacks
//! ```
//!
//! The collector is the only place that sees completions, so callbacks fire
//! in completion order and metrics are folded without shared counters.

mod cancel;
mod metrics;


pub use cancel::CancelToken;
pub use metrics::{ConversionMetrics, MetricsSummary};

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Instant, SystemTime};
use tokio::sync::{mpsc, Semaphore};

use crate::camera::CameraIdentifier;
use crate::catalog::ProfileCatalog;
use crate::color::{ColorManager, LcmsColorManager};
use crate::config::ConversionConfig;
use crate::error::{ConversionError, ConversionOutcome};
use crate::pipeline::{FileConverter, FileDiscovery, StandardCodec};
use crate::planner::{BatchEstimate, ConversionPlanner};
use crate::types::{ConversionResult, ConversionStatus};

type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;
type StatusCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Message attached to results of jobs that never started.
pub const CANCELLED_MESSAGE: &str = "cancelled";

/// Converts batches of files with a shared catalog, codec and color manager.
pub struct ConversionEngine {
    converter: Arc<FileConverter>,
    planner: ConversionPlanner,
    discovery: FileDiscovery,
    progress: Option<ProgressCallback>,
    status: Option<StatusCallback>,
    cancel: CancelToken,
    metrics: Mutex<ConversionMetrics>,
}

impl ConversionEngine {
    /// Engine with the production codec and color manager, reading
    /// profiles from `profile_dir`.
    pub fn new(config: ConversionConfig, profile_dir: impl Into<PathBuf>) -> Self {
        let color: Arc<dyn ColorManager> = Arc::new(LcmsColorManager::new());
        let catalog = Arc::new(ProfileCatalog::new(profile_dir, color.clone()));
        let converter = FileConverter::new(
            config,
            Arc::new(StandardCodec::new()),
            color,
            catalog,
            Arc::new(CameraIdentifier::new()),
        );
        Self::from_converter(converter, ConversionPlanner::default())
    }

    /// Engine around an already assembled converter.
    pub fn from_converter(converter: FileConverter, planner: ConversionPlanner) -> Self {
        let discovery = FileDiscovery::from_config(converter.config());
        Self {
            converter: Arc::new(converter),
            planner,
            discovery,
            progress: None,
            status: None,
            cancel: CancelToken::new(),
            metrics: Mutex::new(ConversionMetrics::new()),
        }
    }

    /// Called with `(finished, total)` after every completion.
    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
    }

    /// Called with a one-line outcome (`completed: a.nef`, ...) after every
    /// completion.
    pub fn set_status_callback<F>(&mut self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.status = Some(Box::new(callback));
    }

    pub fn config(&self) -> &ConversionConfig {
        self.converter.config()
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        self.converter.catalog()
    }

    pub fn planner(&self) -> &ConversionPlanner {
        &self.planner
    }

    /// Token observed by the current run; `stop()` sets it.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Ask the current run to stop. Jobs already running finish; queued jobs
    /// are not started. A stop requested before a run begins cancels that
    /// whole run. The request is cleared once the run returns.
    pub fn stop(&self) {
        tracing::info!("Stop requested");
        self.cancel.cancel();
    }

    /// Workers a run would use without an override.
    pub fn recommended_workers(&self) -> usize {
        self.planner
            .recommended_workers(self.converter.config().max_threads)
    }

    pub fn estimate(&self, files: &[PathBuf]) -> BatchEstimate {
        self.planner.estimate(files)
    }

    /// Supported files under `directory`, sorted.
    pub fn scan_input_files(
        &self,
        directory: &Path,
        recursive: bool,
    ) -> ConversionOutcome<Vec<PathBuf>> {
        let files = self.discovery.scan(directory, recursive)?;
        tracing::info!("Found {} input files in {:?}", files.len(), directory);
        Ok(files)
    }

    /// Metrics of the most recent run.
    pub fn metrics_summary(&self) -> MetricsSummary {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    /// Scan `input_dir` with the configured recursion and convert everything
    /// found. Only a failed scan is an error.
    pub async fn convert_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        workers: Option<usize>,
    ) -> ConversionOutcome<Vec<ConversionResult>> {
        let files = self.scan_input_files(input_dir, self.discovery.recursive())?;
        Ok(self.convert_batch(&files, output_dir, workers).await)
    }

    /// Convert `inputs` into `output_dir`.
    ///
    /// Returns exactly one result per input, in input order. Per-file
    /// failures are reported in their result and never stop other files.
    pub async fn convert_batch(
        &self,
        inputs: &[PathBuf],
        output_dir: &Path,
        workers: Option<usize>,
    ) -> Vec<ConversionResult> {
        let start = Instant::now();

        let outputs = output_paths(inputs, output_dir, &self.config().output.extension);
        let jobs: Vec<(PathBuf, PathBuf)> = inputs.iter().cloned().zip(outputs).collect();

        let results = match jobs.as_slice() {
            [] => Vec::new(),
            [(input, output)] if self.cancel.is_cancelled() => vec![cancelled(input, output)],
            [(input, output)] => {
                let result = run_job(self.converter.clone(), input.clone(), output.clone()).await;
                self.report(1, 1, &result);
                vec![result]
            }
            _ => {
                let workers = workers
                    .unwrap_or_else(|| self.recommended_workers())
                    .max(1);
                self.run_pool(jobs, workers).await
            }
        };

        let mut metrics: ConversionMetrics = results.iter().collect();
        metrics.finish(start.elapsed());
        let summary = metrics.summary();
        *self.metrics.lock().unwrap_or_else(PoisonError::into_inner) = metrics;
        self.cancel.reset();

        tracing::info!(
            "Batch finished in {:.1}s: {} completed, {} failed, {} skipped, {} cancelled",
            summary.total_time,
            summary.completed,
            summary.failed,
            summary.skipped,
            summary.cancelled
        );
        results
    }

    async fn run_pool(&self, jobs: Vec<(PathBuf, PathBuf)>, workers: usize) -> Vec<ConversionResult> {
        let total = jobs.len();
        tracing::info!("Converting {} files with {} workers", total, workers);

        let semaphore = Arc::new(Semaphore::new(workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, ConversionResult)>();

        let mut pending: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(total);
        for (idx, (input, output)) in jobs.into_iter().enumerate() {
            pending.push((input.clone(), output.clone()));

            let semaphore = semaphore.clone();
            let cancel = self.cancel.clone();
            let converter = self.converter.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    return;
                }
                let result = run_job(converter, input, output).await;
                let _ = tx.send((idx, result));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<ConversionResult>> = (0..total).map(|_| None).collect();
        let mut finished = 0;
        let mut stopping = false;

        // Ends once every job has either reported or given up on its permit
        while let Some((idx, result)) = rx.recv().await {
            finished += 1;
            if !stopping {
                self.report(finished, total, &result);
            }
            slots[idx] = Some(result);

            if !stopping && self.cancel.is_cancelled() {
                stopping = true;
                semaphore.close();
                tracing::info!(
                    "Stopping after {}/{} files; waiting for running jobs",
                    finished,
                    total
                );
            }
        }

        slots
            .into_iter()
            .zip(pending)
            .map(|(slot, (input, output))| slot.unwrap_or_else(|| cancelled(&input, &output)))
            .collect()
    }

    fn report(&self, finished: usize, total: usize, result: &ConversionResult) {
        if let Some(progress) = &self.progress {
            progress(finished, total);
        }
        if let Some(status) = &self.status {
            status(&result.status_line());
        }
    }
}

/// Placeholder for a job that was never started because of `stop()`.
fn cancelled(input: &Path, output: &Path) -> ConversionResult {
    let mut result = ConversionResult::pending(input, output);
    result.error_message = Some(CANCELLED_MESSAGE.to_string());
    result.finished_at = SystemTime::now();
    result
}

/// Run one conversion on the blocking pool.
async fn run_job(converter: Arc<FileConverter>, input: PathBuf, output: PathBuf) -> ConversionResult {
    let (job_input, job_output) = (input.clone(), output.clone());
    match tokio::task::spawn_blocking(move || converter.convert(&job_input, &job_output)).await {
        Ok(result) => result,
        Err(e) => {
            let error = ConversionError::Task {
                path: input.clone(),
                message: e.to_string(),
            };
            tracing::error!("{}", error);

            let mut result = ConversionResult::pending(&input, &output);
            result.status = ConversionStatus::Failed;
            result.error_message = Some(error.to_string());
            result.finished_at = SystemTime::now();
            result
        }
    }
}

/// Destination for every input: its path relative to the inputs' deepest
/// common directory, under `output_dir`, with `extension`.
///
/// Destinations are unique. When two inputs would land on the same file
/// (`a.nef` and `a.cr2`), the later one keeps its source extension
/// (`a.cr2.jpg`), then gains a numeric suffix if that is taken too.
pub fn output_paths(inputs: &[PathBuf], output_dir: &Path, extension: &str) -> Vec<PathBuf> {
    let base = common_parent(inputs);
    let mut taken = HashSet::with_capacity(inputs.len());
    inputs
        .iter()
        .map(|input| {
            let relative = base
                .as_deref()
                .and_then(|base| input.strip_prefix(base).ok())
                .filter(|rel| rel.components().all(|c| matches!(c, Component::Normal(_))))
                .map(Path::to_path_buf)
                .or_else(|| input.file_name().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("output"));
            let target = output_dir.join(relative);

            let output = target.with_extension(extension);
            if taken.insert(output.clone()) {
                return output;
            }
            let output = disambiguate(&target, extension, &mut taken);
            tracing::warn!(
                "{:?} shares an output name with an earlier input, writing {:?}",
                input,
                output
            );
            output
        })
        .collect()
}

fn disambiguate(target: &Path, extension: &str, taken: &mut HashSet<PathBuf>) -> PathBuf {
    if let Some(source_ext) = target.extension() {
        let output = target.with_extension(format!("{}.{extension}", source_ext.to_string_lossy()));
        if taken.insert(output.clone()) {
            return output;
        }
    }

    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut n = 1;
    loop {
        let output = target.with_file_name(format!("{stem}-{n}.{extension}"));
        if taken.insert(output.clone()) {
            return output;
        }
        n += 1;
    }
}

fn common_parent(inputs: &[PathBuf]) -> Option<PathBuf> {
    let mut parents = inputs.iter().map(|p| p.parent().unwrap_or(Path::new("")));
    let first = parents.next()?;
    let mut common: Vec<Component> = first.components().collect();

    for parent in parents {
        let shared = common
            .iter()
            .zip(parent.components())
            .take_while(|(a, b)| *a == b)
            .count();
        common.truncate(shared);
    }
    Some(common.iter().collect())
}
