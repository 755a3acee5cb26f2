//! Up-front performance estimates for a discovery run.

use std::time::Duration;

use serde::Serialize;

use crate::error::ConfigError;

/// Average cost of one remote call per stage, used for baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallCosts {
    pub discovery: Duration,
    pub liveness: Duration,
    pub enrichment: Duration,
}

impl Default for CallCosts {
    fn default() -> Self {
        Self {
            discovery: Duration::from_millis(300),
            liveness: Duration::from_millis(300),
            enrichment: Duration::from_millis(500),
        }
    }
}

/// Projected sequential and concurrent time for `positions` items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceEstimate {
    pub positions: usize,
    pub concurrency: usize,
    pub sequential_discovery_secs: f64,
    pub concurrent_discovery_secs: f64,
    pub sequential_enrichment_secs: f64,
    pub concurrent_enrichment_secs: f64,
}

impl PerformanceEstimate {
    /// Estimate discovery plus enrichment time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `concurrency` is zero.
    pub fn new(
        positions: usize,
        concurrency: usize,
        costs: &CallCosts,
    ) -> Result<Self, ConfigError> {
        if concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_requests",
                reason: "must be greater than 0".to_string(),
            });
        }
        let count = positions as f64;
        let lanes = concurrency as f64;
        let discovery = costs.discovery.as_secs_f64();
        let enrichment = costs.enrichment.as_secs_f64();

        Ok(Self {
            positions,
            concurrency,
            sequential_discovery_secs: count * discovery,
            concurrent_discovery_secs: count / lanes * discovery,
            sequential_enrichment_secs: count * enrichment,
            concurrent_enrichment_secs: count / lanes * enrichment,
        })
    }

    #[must_use]
    pub fn sequential_total_secs(&self) -> f64 {
        self.sequential_discovery_secs + self.sequential_enrichment_secs
    }

    #[must_use]
    pub fn concurrent_total_secs(&self) -> f64 {
        self.concurrent_discovery_secs + self.concurrent_enrichment_secs
    }

    #[must_use]
    pub fn time_saved_secs(&self) -> f64 {
        self.sequential_total_secs() - self.concurrent_total_secs()
    }

    #[must_use]
    pub fn improvement_percent(&self) -> f64 {
        let sequential = self.sequential_total_secs();
        if sequential <= 0.0 {
            return 0.0;
        }
        self.time_saved_secs() / sequential * 100.0
    }
}
