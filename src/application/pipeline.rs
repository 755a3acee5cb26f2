//! Pipeline orchestrator.
//!
//! Sequences Discovery → (Filter) → Enrichment for one owner on one network,
//! measures each stage and assembles the [`PipelineRunResult`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::context::{RunContext, RunDeadline};
use super::discovery::DiscoveryStage;
use super::enrichment::EnrichmentStage;
use super::executor::BoundedExecutor;
use super::liveness::LivenessFilter;
use super::progress::TracingProgress;
use super::scheduler::BatchScheduler;
use super::symbol::SymbolTable;
use crate::domain::{
    CallCosts, LedgerEndpoint, Network, OwnerAddress, PerformanceEstimate, PipelineRunResult,
    RunCounts, Stage, StageThroughput, StageTimings, ThroughputReport,
};
use crate::error::{ConfigError, Result};
use crate::port::{LedgerConnector, PositionLedger, ProgressSink};

/// Concurrency and batching for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSettings {
    pub concurrency: usize,
    pub discovery_batch_size: usize,
    pub filter_batch_size: usize,
    pub enrichment_batch_size: usize,
    pub discovery_progress_interval: usize,
    pub enrichment_progress_interval: usize,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            concurrency: 10,
            discovery_batch_size: 100,
            filter_batch_size: 100,
            enrichment_batch_size: 50,
            discovery_progress_interval: 20,
            enrichment_progress_interval: 5,
        }
    }
}

/// Where to reach a network and how hard to hit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRoute {
    pub endpoint: LedgerEndpoint,
    pub stages: StageSettings,
}

/// Run-level behaviour shared by every network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineSettings {
    /// Outer budget for one run, checked between batches.
    pub deadline: Option<Duration>,
    /// Return an empty result instead of failing when every index lookup
    /// fails.
    pub empty_on_total_discovery_failure: bool,
    pub costs: CallCosts,
}

/// Discovers and enriches the positions of an owner.
///
/// One [`BoundedExecutor`] and one ledger handle are kept per network, so
/// concurrent runs against the same endpoint share its concurrency bound.
pub struct PositionPipeline {
    routes: BTreeMap<Network, NetworkRoute>,
    settings: PipelineSettings,
    symbols: Arc<SymbolTable>,
    connector: Arc<dyn LedgerConnector>,
    progress: Arc<dyn ProgressSink>,
    executors: DashMap<Network, Arc<BoundedExecutor>>,
    ledgers: DashMap<Network, Arc<dyn PositionLedger>>,
}

impl PositionPipeline {
    /// Create a pipeline over the enabled `routes`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a route has a zero
    /// concurrency bound or batch size.
    pub fn new(
        routes: BTreeMap<Network, NetworkRoute>,
        settings: PipelineSettings,
        symbols: SymbolTable,
        connector: Arc<dyn LedgerConnector>,
    ) -> Result<Self> {
        for route in routes.values() {
            validate_stages(&route.stages)?;
        }
        Ok(Self {
            routes,
            settings,
            symbols: Arc::new(symbols),
            connector,
            progress: Arc::new(TracingProgress),
            executors: DashMap::new(),
            ledgers: DashMap::new(),
        })
    }

    /// Receive per-batch progress for every stage instead of logging it.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Networks this pipeline can run against.
    pub fn networks(&self) -> impl Iterator<Item = Network> + '_ {
        self.routes.keys().copied()
    }

    /// Settings in effect for `network`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NetworkDisabled`] when the network has no
    /// route.
    pub fn route(&self, network: Network) -> Result<&NetworkRoute> {
        self.routes.get(&network).ok_or_else(|| {
            ConfigError::NetworkDisabled {
                network: network.to_string(),
            }
            .into()
        })
    }

    /// Projected sequential versus concurrent time for `positions` items.
    ///
    /// # Errors
    ///
    /// Same as [`route`](Self::route).
    pub fn estimate(&self, positions: usize, network: Network) -> Result<PerformanceEstimate> {
        let route = self.route(network)?;
        Ok(PerformanceEstimate::new(
            positions,
            route.stages.concurrency,
            &self.settings.costs,
        )?)
    }

    /// Discover every position `owner` holds on `network`.
    ///
    /// With `active_only`, closed positions are filtered out before
    /// enrichment. Output order follows the owner's enumeration order.
    ///
    /// # Errors
    ///
    /// - [`ConfigError`] for a disabled network or unusable endpoint.
    /// - [`Error::Ledger`](crate::error::Error::Ledger) for a malformed owner.
    /// - [`Error::StageUnavailable`](crate::error::Error::StageUnavailable)
    ///   when discovery cannot run.
    /// - [`Error::DeadlineExceeded`](crate::error::Error::DeadlineExceeded)
    ///   when the run budget is spent.
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn discover_positions(
        &self,
        owner: &str,
        network: Network,
        active_only: bool,
    ) -> Result<PipelineRunResult> {
        let route = self.route(network)?;
        let owner = OwnerAddress::parse(owner)?;
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let ledger = self.ledger(route)?;
        let executor = self.executor(network, route.stages.concurrency)?;
        let stages = &route.stages;

        let discovery = DiscoveryStage::new(
            BatchScheduler::new(Arc::clone(&executor), stages.discovery_batch_size)?,
            stages.discovery_progress_interval,
        )
        .empty_on_total_failure(self.settings.empty_on_total_discovery_failure);
        let filter = LivenessFilter::new(
            BatchScheduler::new(Arc::clone(&executor), stages.filter_batch_size)?,
            stages.discovery_progress_interval,
        );
        let enrichment = EnrichmentStage::new(
            BatchScheduler::new(executor, stages.enrichment_batch_size)?,
            stages.enrichment_progress_interval,
            Arc::clone(&self.symbols),
        );

        let started_at = Utc::now();
        let run_started = Instant::now();
        let ctx = RunContext::new(self.progress.as_ref())
            .with_deadline(self.settings.deadline.map(RunDeadline::starting_now));
        let costs = self.settings.costs;
        let mut counts = RunCounts::default();
        let mut timings = StageTimings::default();
        let mut throughput = ThroughputReport::default();

        info!(owner = %owner, network = %network, active_only, "Discovering");
        let stage_started = Instant::now();
        let discovered = discovery.discover(&ledger, &owner, &ctx).await?;
        timings.discovery = stage_started.elapsed();
        counts.owned = discovered.owned;
        counts.discovered = discovered.ids.len();
        counts.discovery_failures = discovered.failures;
        throughput.stages.push(StageThroughput::new(
            Stage::Discovery,
            usize::try_from(discovered.owned).unwrap_or(usize::MAX),
            timings.discovery,
            costs.discovery,
        ));

        if discovered.ids.is_empty() {
            info!(owner = %owner, network = %network, "No positions discovered, done");
            timings.total = run_started.elapsed();
            return Ok(PipelineRunResult {
                run_id,
                owner,
                network,
                active_only,
                started_at,
                positions: Vec::new(),
                counts,
                timings,
                success_rate: counts.success_rate(),
                throughput,
            });
        }

        let candidates = if active_only {
            info!(candidates = discovered.ids.len(), "Filtering");
            let stage_started = Instant::now();
            let candidates = discovered.ids.len();
            let filtered = filter.filter(&ledger, discovered.ids, true, &ctx).await?;
            let elapsed = stage_started.elapsed();
            timings.filter = Some(elapsed);
            counts.filter_failures = filtered.failures;
            counts.filter_failed_open = filtered.failed_open;
            if !filtered.failed_open {
                throughput.stages.push(StageThroughput::new(
                    Stage::Filter,
                    candidates,
                    elapsed,
                    costs.liveness,
                ));
            }
            filtered.ids
        } else {
            debug!("Liveness filter disabled");
            discovered.ids
        };
        counts.live = candidates.len();

        info!(positions = candidates.len(), "Enriching");
        let stage_started = Instant::now();
        let enriched = enrichment.enrich(&ledger, network, candidates, &ctx).await?;
        timings.enrichment = stage_started.elapsed();
        counts.enriched = enriched.positions.len();
        counts.enrichment_failures = enriched.failures;
        throughput.stages.push(StageThroughput::new(
            Stage::Enrichment,
            counts.live,
            timings.enrichment,
            costs.enrichment,
        ));

        timings.total = run_started.elapsed();
        let success_rate = counts.success_rate();
        info!(
            owner = %owner,
            network = %network,
            owned = counts.owned,
            enriched = counts.enriched,
            success_rate,
            filter_failed_open = counts.filter_failed_open,
            elapsed_ms = u64::try_from(timings.total.as_millis()).unwrap_or(u64::MAX),
            baseline_ms = u64::try_from(throughput.total_baseline().as_millis()).unwrap_or(u64::MAX),
            "Done"
        );

        Ok(PipelineRunResult {
            run_id,
            owner,
            network,
            active_only,
            started_at,
            positions: enriched.positions,
            counts,
            timings,
            success_rate,
            throughput,
        })
    }

    fn ledger(&self, route: &NetworkRoute) -> Result<Arc<dyn PositionLedger>> {
        let network = route.endpoint.network;
        if let Some(ledger) = self.ledgers.get(&network) {
            return Ok(Arc::clone(ledger.value()));
        }
        let ledger = self.connector.connect(&route.endpoint)?;
        debug!(network = %network, rpc_url = %route.endpoint.rpc_url, "Connected ledger");
        Ok(Arc::clone(
            self.ledgers.entry(network).or_insert(ledger).value(),
        ))
    }

    fn executor(&self, network: Network, concurrency: usize) -> Result<Arc<BoundedExecutor>> {
        if let Some(executor) = self.executors.get(&network) {
            return Ok(Arc::clone(executor.value()));
        }
        let executor = Arc::new(BoundedExecutor::new(concurrency)?);
        Ok(Arc::clone(
            self.executors.entry(network).or_insert(executor).value(),
        ))
    }
}

fn validate_stages(stages: &StageSettings) -> Result<()> {
    let positive = [
        ("max_concurrent_requests", stages.concurrency),
        ("discovery_batch_size", stages.discovery_batch_size),
        ("filter_batch_size", stages.filter_batch_size),
        ("enrichment_batch_size", stages.enrichment_batch_size),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(ConfigError::InvalidValue {
                field,
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
    }
    Ok(())
}
