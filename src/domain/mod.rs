//! Ledger-agnostic domain types: identities, positions, tick math and run
//! results.

mod estimate;
mod id;
mod network;
mod position;
mod run;

pub mod tick;

pub use estimate::{CallCosts, PerformanceEstimate};
pub use id::{parse_address, OwnerAddress, PositionId};
pub use network::{LedgerEndpoint, Network, Stage};
pub use position::{FeeTier, Position, PositionStatus, RawPosition, TokenSymbols};
pub use run::{PipelineRunResult, RunCounts, StageThroughput, StageTimings, ThroughputReport};
