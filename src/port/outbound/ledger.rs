//! Ledger port for read-only position queries.
//!
//! Mirrors the subset of a `NonfungiblePositionManager` and ERC-20 surface
//! the pipeline consumes. Every call may fail independently; stages decide
//! how to recover.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::{LedgerEndpoint, OwnerAddress, PositionId, RawPosition};
use crate::error::{LedgerResult, Result};

/// Read-only access to position NFTs on one network.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`); the executor issues
/// calls from many tasks at once.
#[async_trait]
pub trait PositionLedger: Send + Sync {
    /// Number of position NFTs held by `owner` (`balanceOf`).
    async fn count_owned(&self, owner: &OwnerAddress) -> LedgerResult<u64>;

    /// Position id at `index` in the owner's enumeration
    /// (`tokenOfOwnerByIndex`). The index is not re-validated.
    async fn owned_at(&self, owner: &OwnerAddress, index: u64) -> LedgerResult<PositionId>;

    /// Liquidity of a position only; the light call used for filtering.
    async fn position_liquidity(&self, id: PositionId) -> LedgerResult<u128>;

    /// Full decoded position state.
    async fn position(&self, id: PositionId) -> LedgerResult<RawPosition>;

    /// ERC-20 symbol of a token.
    async fn resolve_symbol(&self, token: Address) -> LedgerResult<String>;

    /// Cheap reachability check for the whole endpoint.
    async fn probe(&self) -> LedgerResult<()>;
}

/// Builds a [`PositionLedger`] for a configured network.
pub trait LedgerConnector: Send + Sync {
    /// Connect to a network's endpoint.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the endpoint or contract addresses
    /// cannot be used.
    fn connect(&self, endpoint: &LedgerEndpoint) -> Result<Arc<dyn PositionLedger>>;
}
