//! Enrichment stage: turn live ids into full [`Position`] records.

use std::sync::Arc;

use tracing::{info, warn};

use super::context::RunContext;
use super::progress::ProgressCounter;
use super::scheduler::BatchScheduler;
use super::symbol::{SymbolResolver, SymbolTable};
use crate::domain::{Network, Position, PositionId, Stage};
use crate::error::Result;
use crate::port::PositionLedger;

/// Enriched positions for one run.
#[derive(Debug, Clone, Default)]
pub struct Enriched {
    /// Records in input order, failed ids omitted.
    pub positions: Vec<Position>,
    pub failures: usize,
}

#[derive(Debug, Clone)]
pub struct EnrichmentStage {
    scheduler: BatchScheduler,
    progress_interval: usize,
    symbols: Arc<SymbolTable>,
}

impl EnrichmentStage {
    #[must_use]
    pub fn new(scheduler: BatchScheduler, progress_interval: usize, symbols: Arc<SymbolTable>) -> Self {
        Self {
            scheduler,
            progress_interval,
            symbols,
        }
    }

    /// Fetch details and symbols for every id.
    ///
    /// An id whose detail call fails, or whose state does not decode into a
    /// valid position, is omitted; its siblings are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeadlineExceeded`](crate::error::Error::DeadlineExceeded)
    /// when the run deadline passes.
    pub async fn enrich(
        &self,
        ledger: &Arc<dyn PositionLedger>,
        network: Network,
        ids: Vec<PositionId>,
        ctx: &RunContext<'_>,
    ) -> Result<Enriched> {
        if ids.is_empty() {
            return Ok(Enriched::default());
        }

        let total = ids.len();
        info!(
            total,
            network = %network,
            concurrency = self.scheduler.concurrency(),
            batch_size = self.scheduler.chunk_size(),
            "Enriching positions"
        );

        let resolver = SymbolResolver::new(Arc::clone(ledger), Arc::clone(&self.symbols));
        let counter = Arc::new(ProgressCounter::new(
            Stage::Enrichment,
            total,
            self.progress_interval,
        ));

        let outcome = self
            .scheduler
            .run(
                Stage::Enrichment,
                ids.clone(),
                |id| {
                    let ledger = Arc::clone(ledger);
                    let resolver = resolver.clone();
                    let counter = Arc::clone(&counter);
                    async move {
                        let result = enrich_one(ledger.as_ref(), &resolver, network, id).await;
                        counter.record();
                        result
                    }
                },
                ctx,
            )
            .await?;

        let mut positions = Vec::with_capacity(total);
        let mut failures = 0;
        for (id, result) in ids.into_iter().zip(outcome.results) {
            match result {
                Ok(position) => positions.push(position),
                Err(err) => {
                    failures += 1;
                    warn!(position = %id, error = %err, "Failed to enrich position");
                }
            }
        }

        info!(
            enriched = positions.len(),
            failures,
            symbols = resolver.cached(),
            "Enrichment complete"
        );
        Ok(Enriched {
            positions,
            failures,
        })
    }
}

async fn enrich_one(
    ledger: &dyn PositionLedger,
    resolver: &SymbolResolver,
    network: Network,
    id: PositionId,
) -> crate::error::LedgerResult<Position> {
    let raw = ledger.position(id).await?;
    let symbols = resolver.resolve_pair(raw.token0, raw.token1).await;
    Position::from_raw(id, network, raw, symbols)
}
