//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::pipeline::ConcurrencyConfig;
use crate::infrastructure::config::settings::Config;

/// Defaults with per-network tuning off and every batch size set to `batch`.
pub fn untuned(concurrency: usize, batch: usize) -> Config {
    Config {
        concurrency: ConcurrencyConfig {
            max_concurrent_requests: concurrency,
            discovery_batch_size: batch,
            filter_batch_size: batch,
            enrichment_batch_size: batch,
            tune_for_network: false,
            ..ConcurrencyConfig::default()
        },
        ..Config::default()
    }
}
