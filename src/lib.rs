//! lpscan - concurrent discovery of concentrated-liquidity positions.
//!
//! Given an owner address and a network, lpscan enumerates the owner's
//! position NFTs on a `NonfungiblePositionManager`, optionally drops the
//! closed ones, and enriches the rest with token symbols, fee tier and
//! price range. Every remote call runs through one bounded executor per
//! network, batched by a scheduler that reports progress and honours an
//! optional run deadline.
//!
//! # Architecture
//!
//! - [`domain`] - Ledger-agnostic types: positions, tick math, run results
//! - [`port`] - Traits the pipeline depends on (ledger, progress)
//! - [`application`] - Executor, scheduler, stages and the orchestrator
//! - [`infrastructure`] - Configuration and the composition root
//! - `adapter` - JSON-RPC ledger and the CLI (requires the `evm` feature)
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `evm` (default) - alloy-based JSON-RPC ledger and the command line
//! - `testkit` - instrumented in-memory ledger for tests
//!
//! # Example
//!
//! ```no_run
//! use lpscan::domain::Network;
//! use lpscan::infrastructure::bootstrap;
//! use lpscan::infrastructure::config::settings::Config;
//!
//! # async fn demo() -> lpscan::error::Result<()> {
//! let config = Config::load_or_default("lpscan.toml")?;
//! let pipeline = bootstrap::build_evm_pipeline(&config)?;
//! let result = pipeline
//!     .discover_positions("0x000000000000000000000000000000000000dEaD", Network::Bsc, true)
//!     .await?;
//! println!("{} active positions", result.active_count());
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(feature = "evm")]
pub mod adapter;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
