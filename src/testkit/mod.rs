//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`] - Instrumented in-memory [`PositionLedger`](crate::port::PositionLedger)
//!   with scripted failures, random latency and in-flight tracking.
//! - [`connector`] - Connector handing out a shared mock ledger.
//! - [`progress`] - Progress sink that records every batch update.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod connector;
pub mod ledger;
pub mod progress;
