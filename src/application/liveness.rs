//! Liveness filter: drop positions whose liquidity is zero.
//!
//! Uses the light liquidity-only call so closed positions never pay for full
//! enrichment. The stage fails open: if the endpoint cannot be reached at
//! all, every identifier passes through unfiltered.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::context::RunContext;
use super::progress::ProgressCounter;
use super::scheduler::BatchScheduler;
use crate::domain::{PositionId, Stage};
use crate::error::{Error, Result};
use crate::port::PositionLedger;

/// Identifiers that survived the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filtered {
    /// Live ids, in input order.
    pub ids: Vec<PositionId>,
    /// Liquidity lookups that failed and were treated as zero.
    pub failures: usize,
    /// True when the stage was unavailable and the input passed through.
    pub failed_open: bool,
}

impl Filtered {
    fn passthrough(ids: Vec<PositionId>, failed_open: bool) -> Self {
        Self {
            ids,
            failures: 0,
            failed_open,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LivenessFilter {
    scheduler: BatchScheduler,
    progress_interval: usize,
}

impl LivenessFilter {
    #[must_use]
    pub const fn new(scheduler: BatchScheduler, progress_interval: usize) -> Self {
        Self {
            scheduler,
            progress_interval,
        }
    }

    /// Keep only ids with non-zero liquidity.
    ///
    /// With `enabled == false` the input is returned unchanged and no ledger
    /// call is made. A failed lookup for one id excludes that id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeadlineExceeded`] when the run deadline passes.
    /// Stage-wide outages are absorbed by failing open.
    pub async fn filter(
        &self,
        ledger: &Arc<dyn PositionLedger>,
        ids: Vec<PositionId>,
        enabled: bool,
        ctx: &RunContext<'_>,
    ) -> Result<Filtered> {
        if !enabled || ids.is_empty() {
            return Ok(Filtered::passthrough(ids, false));
        }

        match self.run(ledger, ids.clone(), ctx).await {
            Ok(filtered) => Ok(filtered),
            Err(err @ Error::DeadlineExceeded { .. }) => Err(err),
            Err(err) => {
                warn!(error = %err, "Liveness filter unavailable, keeping all positions");
                Ok(Filtered::passthrough(ids, true))
            }
        }
    }

    async fn run(
        &self,
        ledger: &Arc<dyn PositionLedger>,
        ids: Vec<PositionId>,
        ctx: &RunContext<'_>,
    ) -> Result<Filtered> {
        self.scheduler
            .call(ledger.probe())
            .await
            .map_err(|err| Error::unavailable(Stage::Filter, err))?;

        let total = ids.len();
        info!(
            total,
            concurrency = self.scheduler.concurrency(),
            "Filtering closed positions"
        );
        let counter = Arc::new(ProgressCounter::new(
            Stage::Filter,
            total,
            self.progress_interval,
        ));

        let outcome = self
            .scheduler
            .run(
                Stage::Filter,
                ids.clone(),
                |id| {
                    let ledger = Arc::clone(ledger);
                    let counter = Arc::clone(&counter);
                    async move {
                        let result = ledger.position_liquidity(id).await;
                        counter.record();
                        result
                    }
                },
                ctx,
            )
            .await?;

        let mut live = Vec::with_capacity(total);
        let mut failures = 0;
        for (id, result) in ids.into_iter().zip(outcome.results) {
            match result {
                Ok(0) => {}
                Ok(_) => live.push(id),
                Err(err) => {
                    failures += 1;
                    debug!(position = %id, error = %err, "Liquidity lookup failed, treating as closed");
                }
            }
        }

        if failures > 0 {
            warn!(failures, total, "Some liquidity lookups failed");
        }
        info!(live = live.len(), total, "Filter complete");
        Ok(Filtered {
            ids: live,
            failures,
            failed_open: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::context::RunDeadline;
    use crate::application::executor::BoundedExecutor;
    use crate::testkit::ledger::{owner, MockLedger};

    fn filter(chunk: usize) -> LivenessFilter {
        let executor = Arc::new(BoundedExecutor::new(4).unwrap());
        LivenessFilter::new(BatchScheduler::new(executor, chunk).unwrap(), 20)
    }

    fn ids(raw: &[u64]) -> Vec<PositionId> {
        raw.iter().copied().map(PositionId::from).collect()
    }

    #[tokio::test]
    async fn drops_closed_positions_and_keeps_order() {
        let holder = owner(0xA);
        let ledger: Arc<dyn PositionLedger> = Arc::new(
            MockLedger::builder()
                .with_active(holder, 10)
                .with_closed(holder, 11)
                .with_active(holder, 12)
                .with_latency_ms(0, 8)
                .build(),
        );

        let filtered = filter(2)
            .filter(&ledger, ids(&[10, 11, 12]), true, &RunContext::default())
            .await
            .unwrap();

        assert_eq!(filtered.ids, ids(&[10, 12]));
        assert!(!filtered.failed_open);
    }

    #[tokio::test]
    async fn disabled_filter_makes_no_calls() {
        let mock = Arc::new(MockLedger::builder().with_closed(owner(1), 1).build());
        let ledger: Arc<dyn PositionLedger> = mock.clone();

        let filtered = filter(2)
            .filter(&ledger, ids(&[1]), false, &RunContext::default())
            .await
            .unwrap();

        assert_eq!(filtered.ids, ids(&[1]));
        assert_eq!(mock.stats().liquidity_calls(), 0);
    }

    #[tokio::test]
    async fn failed_lookup_excludes_only_that_id() {
        let holder = owner(2);
        let ledger: Arc<dyn PositionLedger> = Arc::new(
            MockLedger::builder()
                .with_active(holder, 1)
                .with_active(holder, 2)
                .failing_liquidity(1)
                .build(),
        );

        let filtered = filter(5)
            .filter(&ledger, ids(&[1, 2]), true, &RunContext::default())
            .await
            .unwrap();

        assert_eq!(filtered.ids, ids(&[2]));
        assert_eq!(filtered.failures, 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_open() {
        let holder = owner(3);
        let mock = Arc::new(
            MockLedger::builder()
                .with_closed(holder, 7)
                .unreachable_probe()
                .build(),
        );
        let ledger: Arc<dyn PositionLedger> = mock.clone();

        let filtered = filter(5)
            .filter(&ledger, ids(&[7]), true, &RunContext::default())
            .await
            .unwrap();

        assert_eq!(filtered.ids, ids(&[7]));
        assert!(filtered.failed_open);
        assert_eq!(mock.stats().liquidity_calls(), 0);
    }

    #[tokio::test]
    async fn deadline_is_not_swallowed() {
        let holder = owner(4);
        let ledger: Arc<dyn PositionLedger> = Arc::new(
            MockLedger::builder()
                .with_active(holder, 1)
                .build(),
        );
        let ctx = RunContext::default()
            .with_deadline(Some(RunDeadline::starting_now(Duration::ZERO)));

        let err = filter(1)
            .filter(&ledger, ids(&[1]), true, &ctx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::DeadlineExceeded {
                stage: Stage::Filter,
                ..
            }
        ));
    }
}
