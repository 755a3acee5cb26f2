//! Application services (use cases).
//!
//! The bounded executor and batch scheduler are the concurrency core; the
//! three stages build on them and [`PositionPipeline`] sequences the stages.

pub mod context;
pub mod discovery;
pub mod enrichment;
pub mod executor;
pub mod liveness;
pub mod pipeline;
pub mod progress;
pub mod scheduler;
pub mod symbol;

pub use context::{RunContext, RunDeadline};
pub use discovery::{Discovered, DiscoveryStage};
pub use enrichment::{Enriched, EnrichmentStage};
pub use executor::BoundedExecutor;
pub use liveness::{Filtered, LivenessFilter};
pub use pipeline::{NetworkRoute, PipelineSettings, PositionPipeline, StageSettings};
pub use progress::{ProgressCounter, TracingProgress};
pub use scheduler::{BatchOutcome, BatchScheduler};
pub use symbol::{fallback_label, SymbolResolver, SymbolTable};
