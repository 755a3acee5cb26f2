//! Progress reporting port.

use crate::domain::Stage;

/// Observation emitted after each batch completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub stage: Stage,
    /// 1-based index of the batch just finished.
    pub batch: usize,
    pub total_batches: usize,
    /// Items processed so far in this stage, successful or not.
    pub completed: usize,
    pub total: usize,
}

impl ProgressUpdate {
    /// Completion percentage in `[0, 100]`.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Receives batch-level progress.
///
/// Called from the scheduler between batches, never concurrently for the
/// same stage.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, update: ProgressUpdate);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _update: ProgressUpdate) {}
}
