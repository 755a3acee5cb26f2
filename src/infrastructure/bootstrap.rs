//! Composition root: turn a [`Config`] into a ready [`PositionPipeline`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::application::{NetworkRoute, PipelineSettings, PositionPipeline, StageSettings};
use crate::domain::Network;
use crate::error::Result;
use crate::infrastructure::config::pipeline::ConcurrencyConfig;
use crate::infrastructure::config::settings::Config;
use crate::port::LedgerConnector;

impl From<&ConcurrencyConfig> for StageSettings {
    fn from(config: &ConcurrencyConfig) -> Self {
        Self {
            concurrency: config.max_concurrent_requests,
            discovery_batch_size: config.discovery_batch_size,
            filter_batch_size: config.filter_batch_size,
            enrichment_batch_size: config.enrichment_batch_size,
            discovery_progress_interval: config.discovery_progress_interval,
            enrichment_progress_interval: config.enrichment_progress_interval,
        }
    }
}

/// Routes for every enabled network, with per-network tuning applied.
#[must_use]
pub fn routes(config: &Config) -> BTreeMap<Network, NetworkRoute> {
    config
        .networks
        .enabled()
        .map(|network| {
            let stages = StageSettings::from(&config.concurrency.tuned_for(network));
            (
                network.network,
                NetworkRoute {
                    endpoint: network.endpoint(),
                    stages,
                },
            )
        })
        .collect()
}

#[must_use]
pub fn pipeline_settings(config: &Config) -> PipelineSettings {
    PipelineSettings {
        deadline: config.pipeline.deadline(),
        empty_on_total_discovery_failure: config.pipeline.empty_on_total_discovery_failure,
        costs: config.pipeline.call_costs(),
    }
}

/// Build a pipeline over `connector`.
///
/// # Errors
///
/// Returns a configuration error for invalid symbols or stage settings.
pub fn build_pipeline(
    config: &Config,
    connector: Arc<dyn LedgerConnector>,
) -> Result<PositionPipeline> {
    let routes = routes(config);
    info!(
        networks = routes.len(),
        tuned = config.concurrency.tune_for_network,
        "Building position pipeline"
    );
    PositionPipeline::new(
        routes,
        pipeline_settings(config),
        config.symbol_table()?,
        connector,
    )
}

/// Build a pipeline backed by JSON-RPC endpoints.
///
/// # Errors
///
/// See [`build_pipeline`].
#[cfg(feature = "evm")]
pub fn build_evm_pipeline(config: &Config) -> Result<PositionPipeline> {
    use crate::adapter::outbound::evm::EvmConnector;

    build_pipeline(config, Arc::new(EvmConnector::new()))
}
