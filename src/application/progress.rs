//! Progress instrumentation.
//!
//! Two granularities: [`ProgressCounter`] is bumped atomically by every unit
//! and logs every `interval` completions; [`TracingProgress`] receives the
//! scheduler's per-batch observations.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::domain::Stage;
use crate::port::{ProgressSink, ProgressUpdate};

/// Shared completion counter for the units of one stage.
#[derive(Debug)]
pub struct ProgressCounter {
    stage: Stage,
    total: usize,
    interval: usize,
    completed: AtomicUsize,
}

impl ProgressCounter {
    /// An `interval` of zero disables interval logging.
    #[must_use]
    pub fn new(stage: Stage, total: usize, interval: usize) -> Self {
        Self {
            stage,
            total,
            interval,
            completed: AtomicUsize::new(0),
        }
    }

    /// Record one finished unit, successful or not. Returns the new count.
    pub fn record(&self) -> usize {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.interval > 0 && completed % self.interval == 0 {
            let percent = if self.total == 0 {
                100.0
            } else {
                completed as f64 / self.total as f64 * 100.0
            };
            info!(
                stage = %self.stage,
                completed,
                total = self.total,
                percent = (percent * 10.0).round() / 10.0,
                "Progress"
            );
        }
        completed
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Logs batch completions through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_progress(&self, update: ProgressUpdate) {
        debug!(
            stage = %update.stage,
            batch = update.batch,
            total_batches = update.total_batches,
            completed = update.completed,
            total = update.total,
            "Batch complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn counter_counts_every_record() {
        let counter = ProgressCounter::new(Stage::Discovery, 3, 2);
        assert_eq!(counter.record(), 1);
        assert_eq!(counter.record(), 2);
        assert_eq!(counter.record(), 3);
        assert_eq!(counter.completed(), 3);
    }

    #[test]
    fn zero_interval_still_counts() {
        let counter = ProgressCounter::new(Stage::Filter, 1, 0);
        counter.record();
        assert_eq!(counter.completed(), 1);
    }

    #[tokio::test]
    async fn counter_is_safe_across_tasks() {
        let counter = Arc::new(ProgressCounter::new(Stage::Enrichment, 64, 5));
        let mut handles = Vec::new();
        for _ in 0..64 {
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                counter.record();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.completed(), 64);
    }
}
