//! Batch scheduler.
//!
//! Splits a work list into contiguous chunks and drives the
//! [`BoundedExecutor`] one chunk at a time. A chunk always runs to completion
//! before the next one starts, which bounds peak bookkeeping independent of
//! input size and gives a natural checkpoint for progress and deadlines.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::context::RunContext;
use super::executor::BoundedExecutor;
use crate::domain::Stage;
use crate::error::{ConfigError, Error, LedgerResult, Result};
use crate::port::ProgressUpdate;

/// Per-item results of a scheduled run, in input order.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub results: Vec<LedgerResult<T>>,
    /// Number of chunks dispatched.
    pub batches: usize,
}

impl<T> BatchOutcome<T> {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            batches: 0,
        }
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }
}

/// Drives an executor chunk by chunk.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    executor: Arc<BoundedExecutor>,
    chunk_size: usize,
}

impl BatchScheduler {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `chunk_size` is zero.
    pub fn new(executor: Arc<BoundedExecutor>, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch_size",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(Self {
            executor,
            chunk_size,
        })
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.executor.limit()
    }

    /// Run one call under the shared bound, outside any batch.
    pub async fn call<T, Fut>(&self, unit: Fut) -> LedgerResult<T>
    where
        Fut: Future<Output = LedgerResult<T>>,
    {
        self.executor.call(unit).await
    }

    /// Run `make_unit` over every item.
    ///
    /// Items are pulled one chunk at a time, so a lazy iterator is never
    /// materialized beyond the chunk in flight. Emits one [`ProgressUpdate`]
    /// per chunk. The run deadline, if any, is
    /// checked before each chunk; a chunk already started is never cut short.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeadlineExceeded`] when the deadline passes between
    /// chunks. Per-item failures are reported in the outcome, not here.
    pub async fn run<I, T, F, Fut>(
        &self,
        stage: Stage,
        items: I,
        mut make_unit: F,
        ctx: &RunContext<'_>,
    ) -> Result<BatchOutcome<T>>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = LedgerResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let mut items = items.into_iter();
        let total = items.len();
        if total == 0 {
            return Ok(BatchOutcome::empty());
        }

        let chunk_size = self.chunk_size.min(total);
        let total_batches = total.div_ceil(chunk_size);
        let mut results = Vec::with_capacity(chunk_size);

        for batch in 1..=total_batches {
            if let Some(deadline) = ctx.deadline {
                if deadline.is_expired() {
                    return Err(Error::DeadlineExceeded {
                        stage,
                        elapsed: deadline.elapsed(),
                    });
                }
            }

            let units: Vec<Fut> = items.by_ref().take(chunk_size).map(&mut make_unit).collect();
            debug!(
                stage = %stage,
                batch,
                total_batches,
                size = units.len(),
                "Dispatching batch"
            );

            results.extend(self.executor.run(units).await);

            ctx.progress.on_progress(ProgressUpdate {
                stage,
                batch,
                total_batches,
                completed: results.len(),
                total,
            });
        }

        Ok(BatchOutcome {
            results,
            batches: total_batches,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::context::RunDeadline;
    use crate::error::LedgerError;
    use crate::testkit::progress::RecordingProgress;

    fn scheduler(limit: usize, chunk: usize) -> BatchScheduler {
        BatchScheduler::new(Arc::new(BoundedExecutor::new(limit).unwrap()), chunk).unwrap()
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let executor = Arc::new(BoundedExecutor::new(1).unwrap());
        assert!(BatchScheduler::new(executor, 0).is_err());
    }

    #[tokio::test]
    async fn five_items_in_chunks_of_two_dispatch_three_batches() {
        let progress = RecordingProgress::new();
        let ctx = RunContext::new(&progress);

        let outcome = scheduler(4, 2)
            .run(Stage::Discovery, 0..5u32, |i| async move { Ok(i) }, &ctx)
            .await
            .unwrap();

        assert_eq!(outcome.batches, 3);
        let updates = progress.updates();
        assert_eq!(updates.len(), 3);
        let completed: Vec<usize> = updates.iter().map(|u| u.completed).collect();
        // Batch sizes 2, 2, 1.
        assert_eq!(completed, vec![2, 4, 5]);
        assert!(updates.iter().all(|u| u.total == 5 && u.total_batches == 3));
        assert_eq!(
            outcome.results.into_iter().map(|r| r.unwrap()).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[tokio::test]
    async fn chunk_size_is_capped_by_input_length() {
        let progress = RecordingProgress::new();
        let ctx = RunContext::new(&progress);

        let outcome = scheduler(2, 50)
            .run(Stage::Enrichment, vec![1u8, 2, 3], |i| async move { Ok(i) }, &ctx)
            .await
            .unwrap();

        assert_eq!(outcome.batches, 1);
        assert_eq!(progress.updates().len(), 1);
    }

    #[tokio::test]
    async fn empty_input_dispatches_nothing() {
        let progress = RecordingProgress::new();
        let ctx = RunContext::new(&progress);

        let outcome = scheduler(2, 2)
            .run(Stage::Filter, Vec::<u8>::new(), |i| async move { Ok(i) }, &ctx)
            .await
            .unwrap();

        assert_eq!(outcome.batches, 0);
        assert!(progress.updates().is_empty());
    }

    #[tokio::test]
    async fn failures_are_reported_per_item() {
        let ctx = RunContext::default();
        let outcome = scheduler(2, 2)
            .run(
                Stage::Discovery,
                0..4u32,
                |i| async move {
                    if i % 2 == 0 {
                        Ok(i)
                    } else {
                        Err(LedgerError::Network("flaky".into()))
                    }
                },
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(outcome.failures(), 2);
        assert!(outcome.results[0].is_ok());
        assert!(outcome.results[1].is_err());
    }

    #[tokio::test]
    async fn items_are_pulled_one_chunk_at_a_time() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let pulled = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&pulled);
        let ctx = RunContext::default()
            .with_deadline(Some(RunDeadline::starting_now(Duration::from_millis(10))));

        // A count no one could hold in memory: stopping after the first
        // chunk proves the range is never collected.
        let result = scheduler(2, 2)
            .run(
                Stage::Discovery,
                (0..usize::MAX).inspect(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
                |i| async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok(i)
                },
                &ctx,
            )
            .await;

        assert!(matches!(result, Err(Error::DeadlineExceeded { .. })));
        assert_eq!(pulled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_deadline_stops_before_next_batch() {
        let progress = RecordingProgress::new();
        let ctx = RunContext::new(&progress)
            .with_deadline(Some(RunDeadline::starting_now(Duration::from_millis(20))));

        let result = scheduler(1, 1)
            .run(
                Stage::Enrichment,
                0..10u32,
                |i| async move {
                    tokio::time::sleep(Duration::from_millis(15)).await;
                    Ok(i)
                },
                &ctx,
            )
            .await;

        assert!(matches!(
            result,
            Err(Error::DeadlineExceeded {
                stage: Stage::Enrichment,
                ..
            })
        ));
        let batches = progress.updates().len();
        assert!((1..10).contains(&batches), "ran {batches} batches");
    }
}
