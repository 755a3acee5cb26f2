//! Concurrency and pipeline behaviour configuration.

use std::time::Duration;

use serde::Deserialize;

use super::network::NetworkConfig;
use crate::domain::CallCosts;
use crate::error::ConfigError;

/// Concurrency bound, chunk sizes and progress cadence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConcurrencyConfig {
    /// Maximum remote calls in flight per endpoint.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_discovery_batch_size")]
    pub discovery_batch_size: usize,
    #[serde(default = "default_filter_batch_size")]
    pub filter_batch_size: usize,
    #[serde(default = "default_enrichment_batch_size")]
    pub enrichment_batch_size: usize,
    /// Log discovery and filter progress every N completed calls.
    #[serde(default = "default_discovery_progress_interval")]
    pub discovery_progress_interval: usize,
    /// Log enrichment progress every N completed positions.
    #[serde(default = "default_enrichment_progress_interval")]
    pub enrichment_progress_interval: usize,
    /// Replace the concurrency bound and discovery/filter chunk sizes with
    /// the network's tuned values.
    #[serde(default = "default_tune_for_network")]
    pub tune_for_network: bool,
}

fn default_max_concurrent_requests() -> usize {
    10
}

fn default_discovery_batch_size() -> usize {
    100
}

fn default_filter_batch_size() -> usize {
    100
}

fn default_enrichment_batch_size() -> usize {
    50
}

fn default_discovery_progress_interval() -> usize {
    20
}

fn default_enrichment_progress_interval() -> usize {
    5
}

fn default_tune_for_network() -> bool {
    true
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            discovery_batch_size: default_discovery_batch_size(),
            filter_batch_size: default_filter_batch_size(),
            enrichment_batch_size: default_enrichment_batch_size(),
            discovery_progress_interval: default_discovery_progress_interval(),
            enrichment_progress_interval: default_enrichment_progress_interval(),
            tune_for_network: default_tune_for_network(),
        }
    }
}

impl ConcurrencyConfig {
    /// Effective settings for `network`.
    #[must_use]
    pub fn tuned_for(&self, network: &NetworkConfig) -> Self {
        if !self.tune_for_network {
            return self.clone();
        }
        Self {
            max_concurrent_requests: network.tuned_concurrency,
            discovery_batch_size: network.tuned_batch_size,
            filter_batch_size: network.tuned_batch_size,
            ..self.clone()
        }
    }

    /// Pin the concurrency bound, disabling per-network tuning.
    #[must_use]
    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests;
        self.tune_for_network = false;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_concurrent_requests", self.max_concurrent_requests),
            ("discovery_batch_size", self.discovery_batch_size),
            ("filter_batch_size", self.filter_batch_size),
            ("enrichment_batch_size", self.enrichment_batch_size),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Run-level behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineConfig {
    /// Outer time budget for one run, checked between batches.
    #[serde(default)]
    pub deadline_secs: Option<u64>,
    /// When every index lookup fails, return an empty result instead of
    /// failing discovery.
    #[serde(default)]
    pub empty_on_total_discovery_failure: bool,
    /// Average per-call costs for throughput baselines and estimates.
    #[serde(default = "default_discovery_cost_ms")]
    pub discovery_cost_ms: u64,
    #[serde(default = "default_filter_cost_ms")]
    pub filter_cost_ms: u64,
    #[serde(default = "default_enrichment_cost_ms")]
    pub enrichment_cost_ms: u64,
}

fn default_discovery_cost_ms() -> u64 {
    300
}

fn default_filter_cost_ms() -> u64 {
    300
}

fn default_enrichment_cost_ms() -> u64 {
    500
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deadline_secs: None,
            empty_on_total_discovery_failure: false,
            discovery_cost_ms: default_discovery_cost_ms(),
            filter_cost_ms: default_filter_cost_ms(),
            enrichment_cost_ms: default_enrichment_cost_ms(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn call_costs(&self) -> CallCosts {
        CallCosts {
            discovery: Duration::from_millis(self.discovery_cost_ms),
            liveness: Duration::from_millis(self.filter_cost_ms),
            enrichment: Duration::from_millis(self.enrichment_cost_ms),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.deadline_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "deadline_secs",
                reason: "must be greater than 0 when set".to_string(),
            });
        }
        Ok(())
    }
}
