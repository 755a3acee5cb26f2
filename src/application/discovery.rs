//! Discovery stage: enumerate every position id an owner holds.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::context::RunContext;
use super::progress::ProgressCounter;
use super::scheduler::BatchScheduler;
use crate::domain::{OwnerAddress, PositionId, Stage};
use crate::error::{Error, LedgerError, Result};
use crate::port::PositionLedger;

/// Identifiers enumerated for one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovered {
    /// Count reported by the ledger.
    pub owned: u64,
    /// Successfully enumerated ids, in index order.
    pub ids: Vec<PositionId>,
    /// Indices whose lookup failed.
    pub failures: usize,
}

/// Enumerates an owner's position ids index by index.
#[derive(Debug, Clone)]
pub struct DiscoveryStage {
    scheduler: BatchScheduler,
    progress_interval: usize,
    empty_on_total_failure: bool,
}

impl DiscoveryStage {
    #[must_use]
    pub const fn new(scheduler: BatchScheduler, progress_interval: usize) -> Self {
        Self {
            scheduler,
            progress_interval,
            empty_on_total_failure: false,
        }
    }

    /// Return an empty list instead of an error when every index fails.
    #[must_use]
    pub const fn empty_on_total_failure(mut self, enabled: bool) -> Self {
        self.empty_on_total_failure = enabled;
        self
    }

    /// Discover all position ids held by `owner`.
    ///
    /// Failed indices are logged and skipped. Order of the result follows
    /// index order.
    ///
    /// # Errors
    ///
    /// - [`Error::Ledger`] with [`LedgerError::InvalidAddress`] for a
    ///   malformed owner.
    /// - [`Error::StageUnavailable`] when the ownership count cannot be
    ///   read, or when every index lookup fails.
    /// - [`Error::DeadlineExceeded`] when the run deadline passes.
    pub async fn discover(
        &self,
        ledger: &Arc<dyn PositionLedger>,
        owner: &OwnerAddress,
        ctx: &RunContext<'_>,
    ) -> Result<Discovered> {
        let owned = match self.scheduler.call(ledger.count_owned(owner)).await {
            Ok(count) => count,
            Err(err @ LedgerError::InvalidAddress { .. }) => return Err(err.into()),
            Err(err) => {
                warn!(owner = %owner, error = %err, "Failed to read position count");
                return Err(Error::unavailable(Stage::Discovery, err));
            }
        };

        if owned == 0 {
            info!(owner = %owner, "Owner holds no positions");
            return Ok(Discovered::default());
        }

        info!(
            owner = %owner,
            owned,
            concurrency = self.scheduler.concurrency(),
            batch_size = self.scheduler.chunk_size(),
            "Discovering positions"
        );

        let total = usize::try_from(owned).unwrap_or(usize::MAX);
        let counter = Arc::new(ProgressCounter::new(
            Stage::Discovery,
            total,
            self.progress_interval,
        ));

        let outcome = self
            .scheduler
            .run(
                Stage::Discovery,
                (0..total).map(|index| index as u64),
                |index| {
                    let ledger = Arc::clone(ledger);
                    let owner = *owner;
                    let counter = Arc::clone(&counter);
                    async move {
                        let result = ledger.owned_at(&owner, index).await;
                        counter.record();
                        if let Err(err) = &result {
                            debug!(owner = %owner, index, error = %err, "Index lookup failed");
                        }
                        result
                    }
                },
                ctx,
            )
            .await?;

        let mut ids = Vec::with_capacity(outcome.results.len());
        let mut failures = 0;
        let mut last_error = None;
        for result in outcome.results {
            match result {
                Ok(id) => ids.push(id),
                Err(err) => {
                    failures += 1;
                    last_error = Some(err);
                }
            }
        }

        if ids.is_empty() {
            if let Some(err) = last_error {
                if !self.empty_on_total_failure {
                    warn!(owner = %owner, owned, error = %err, "Every index lookup failed");
                    return Err(Error::unavailable(Stage::Discovery, err));
                }
                warn!(owner = %owner, owned, "Every index lookup failed, returning no positions");
            }
        } else if failures > 0 {
            warn!(owner = %owner, failures, owned, "Some index lookups failed");
        }

        info!(owner = %owner, discovered = ids.len(), owned, "Discovery complete");
        Ok(Discovered {
            owned,
            ids,
            failures,
        })
    }
}
