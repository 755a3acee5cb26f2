//! Pipeline run results and throughput accounting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use super::id::OwnerAddress;
use super::network::{Network, Stage};
use super::position::Position;

/// Item counts collected across one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    /// Positions the ledger reports as owned.
    pub owned: u64,
    /// Identifiers successfully enumerated.
    pub discovered: usize,
    /// Identifiers handed to enrichment (after the liveness filter, if any).
    pub live: usize,
    /// Positions successfully enriched.
    pub enriched: usize,
    pub discovery_failures: usize,
    pub filter_failures: usize,
    pub enrichment_failures: usize,
    /// The liveness filter could not run and passed every id through, so
    /// closed positions may be present.
    pub filter_failed_open: bool,
}

impl RunCounts {
    /// Percentage of enrichment inputs that produced a record.
    ///
    /// Zero when nothing reached enrichment.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.live == 0 {
            return 0.0;
        }
        self.enriched as f64 / self.live as f64 * 100.0
    }
}

/// Wall-clock time spent in each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageTimings {
    #[serde(serialize_with = "as_secs")]
    pub discovery: Duration,
    /// `None` when the liveness filter was skipped.
    #[serde(serialize_with = "as_opt_secs")]
    pub filter: Option<Duration>,
    #[serde(serialize_with = "as_secs")]
    pub enrichment: Duration,
    #[serde(serialize_with = "as_secs")]
    pub total: Duration,
}

/// Concurrent time versus a sequential baseline for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageThroughput {
    pub stage: Stage,
    pub items: usize,
    #[serde(serialize_with = "as_secs")]
    pub actual: Duration,
    /// `items × average per-call cost`.
    #[serde(serialize_with = "as_secs")]
    pub baseline: Duration,
}

impl StageThroughput {
    #[must_use]
    pub fn new(stage: Stage, items: usize, actual: Duration, per_item_cost: Duration) -> Self {
        Self {
            stage,
            items,
            actual,
            baseline: per_item_cost.mul_f64(items as f64),
        }
    }

    /// Baseline divided by actual time; `None` for an instantaneous stage.
    #[must_use]
    pub fn improvement_ratio(&self) -> Option<f64> {
        let actual = self.actual.as_secs_f64();
        (actual > 0.0).then(|| self.baseline.as_secs_f64() / actual)
    }

    /// Time saved relative to the baseline, negative when slower.
    #[must_use]
    pub fn saved_secs(&self) -> f64 {
        self.baseline.as_secs_f64() - self.actual.as_secs_f64()
    }

    /// Saved time as a percentage of the baseline.
    #[must_use]
    pub fn improvement_percent(&self) -> f64 {
        let baseline = self.baseline.as_secs_f64();
        if baseline <= 0.0 {
            return 0.0;
        }
        self.saved_secs() / baseline * 100.0
    }
}

/// Informational throughput comparison; never used for control decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThroughputReport {
    pub stages: Vec<StageThroughput>,
}

impl ThroughputReport {
    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageThroughput> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    #[must_use]
    pub fn total_baseline(&self) -> Duration {
        self.stages.iter().map(|s| s.baseline).sum()
    }

    #[must_use]
    pub fn total_actual(&self) -> Duration {
        self.stages.iter().map(|s| s.actual).sum()
    }
}

/// Result of one `discover_positions` call.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunResult {
    pub run_id: Uuid,
    pub owner: OwnerAddress,
    pub network: Network,
    pub active_only: bool,
    pub started_at: DateTime<Utc>,
    /// Enriched positions in discovery enumeration order.
    pub positions: Vec<Position>,
    pub counts: RunCounts,
    pub timings: StageTimings,
    pub success_rate: f64,
    pub throughput: ThroughputReport,
}

impl PipelineRunResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Number of positions with non-zero liquidity.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_active()).count()
    }
}

fn as_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

fn as_opt_secs<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_some(&d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_is_zero_without_input() {
        assert_eq!(RunCounts::default().success_rate(), 0.0);
    }

    #[test]
    fn success_rate_uses_enrichment_input() {
        let counts = RunCounts {
            live: 4,
            enriched: 3,
            ..RunCounts::default()
        };
        assert!((counts.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stage_throughput_computes_baseline_and_ratio() {
        let stage = StageThroughput::new(
            Stage::Enrichment,
            10,
            Duration::from_secs(1),
            Duration::from_millis(500),
        );
        assert_eq!(stage.baseline, Duration::from_secs(5));
        assert_eq!(stage.improvement_ratio(), Some(5.0));
        assert!((stage.saved_secs() - 4.0).abs() < 1e-9);
        assert!((stage.improvement_percent() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn stage_throughput_without_elapsed_time_has_no_ratio() {
        let stage =
            StageThroughput::new(Stage::Filter, 0, Duration::ZERO, Duration::from_millis(300));
        assert_eq!(stage.improvement_ratio(), None);
        assert_eq!(stage.improvement_percent(), 0.0);
    }

    #[test]
    fn report_sums_stages() {
        let report = ThroughputReport {
            stages: vec![
                StageThroughput::new(
                    Stage::Discovery,
                    2,
                    Duration::from_millis(100),
                    Duration::from_millis(300),
                ),
                StageThroughput::new(
                    Stage::Enrichment,
                    2,
                    Duration::from_millis(200),
                    Duration::from_millis(500),
                ),
            ],
        };
        assert_eq!(report.total_baseline(), Duration::from_millis(1600));
        assert_eq!(report.total_actual(), Duration::from_millis(300));
        assert!(report.stage(Stage::Filter).is_none());
    }

    #[test]
    fn timings_serialize_as_seconds() {
        let timings = StageTimings {
            discovery: Duration::from_millis(1500),
            filter: None,
            enrichment: Duration::ZERO,
            total: Duration::from_secs(2),
        };
        let json = serde_json::to_value(timings).unwrap();
        assert_eq!(json["discovery"], 1.5);
        assert!(json["filter"].is_null());
    }
}
