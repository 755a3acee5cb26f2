//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The pipeline talks to the outside world exclusively through these traits:
//!
//! - [`PositionLedger`] / [`LedgerConnector`] - read-only ledger access
//! - [`ProgressSink`] - per-chunk progress observations
//!
//! Adapters in [`crate::adapter`] implement them; the test kit provides
//! instrumented in-memory versions.

pub mod outbound;

pub use outbound::ledger::{LedgerConnector, PositionLedger};
pub use outbound::progress::{NoopProgress, ProgressSink, ProgressUpdate};
