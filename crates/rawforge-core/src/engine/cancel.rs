use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run-scoped stop flag.
///
/// Read only at checkpoints: before a queued job starts and after each
/// completion. A job that already started always runs to the end.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag once a run has returned.
    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
