//! [`PositionLedger`] over a JSON-RPC endpoint.

use std::fmt::Display;

use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use tracing::debug;

use super::contracts::{IERC20Metadata, INonfungiblePositionManager};
use crate::domain::{LedgerEndpoint, OwnerAddress, PositionId, RawPosition};
use crate::error::{ConfigError, LedgerError, LedgerResult, Result};
use crate::port::PositionLedger;

/// Revert reason of `positions()` for a burned or never-minted id.
const INVALID_TOKEN_ID: &str = "Invalid token ID";

/// Reads positions from a `NonfungiblePositionManager` deployment.
pub struct EvmLedger {
    provider: DynProvider,
    manager: INonfungiblePositionManager::INonfungiblePositionManagerInstance<DynProvider>,
    chain_id: u64,
}

impl EvmLedger {
    /// Create a ledger for `endpoint`. No request is sent until the first
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the RPC URL does not parse.
    pub fn new(endpoint: &LedgerEndpoint) -> Result<Self> {
        let rpc_url: url::Url =
            endpoint
                .rpc_url
                .parse()
                .map_err(|e: url::ParseError| ConfigError::InvalidValue {
                    field: "rpc_url",
                    reason: e.to_string(),
                })?;
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        let manager = INonfungiblePositionManager::new(endpoint.position_manager, provider.clone());

        Ok(Self {
            provider,
            manager,
            chain_id: endpoint.chain_id,
        })
    }

    #[must_use]
    pub fn position_manager(&self) -> Address {
        *self.manager.address()
    }
}

fn call_error(err: alloy_contract::Error) -> LedgerError {
    match err {
        alloy_contract::Error::AbiError(e) => LedgerError::Decode(e.to_string()),
        other => LedgerError::Network(other.to_string()),
    }
}

fn position_error(id: PositionId, err: alloy_contract::Error) -> LedgerError {
    if err.to_string().contains(INVALID_TOKEN_ID) {
        return LedgerError::UnknownResource(id);
    }
    call_error(err)
}

/// Convert an ABI integer into the narrower type the domain uses.
fn narrow<S, T>(field: &str, value: S) -> LedgerResult<T>
where
    T: TryFrom<S>,
    T::Error: Display,
{
    T::try_from(value).map_err(|e| LedgerError::Decode(format!("{field}: {e}")))
}

#[async_trait]
impl PositionLedger for EvmLedger {
    async fn count_owned(&self, owner: &OwnerAddress) -> LedgerResult<u64> {
        let count: U256 = self
            .manager
            .balanceOf(owner.address())
            .call()
            .await
            .map_err(call_error)?;
        narrow("balanceOf", count)
    }

    async fn owned_at(&self, owner: &OwnerAddress, index: u64) -> LedgerResult<PositionId> {
        let id: U256 = self
            .manager
            .tokenOfOwnerByIndex(owner.address(), U256::from(index))
            .call()
            .await
            .map_err(call_error)?;
        Ok(PositionId::new(id))
    }

    async fn position_liquidity(&self, id: PositionId) -> LedgerResult<u128> {
        // The contract only exposes the full tuple; keep just the liquidity.
        let state = self
            .manager
            .positions(id.as_u256())
            .call()
            .await
            .map_err(|e| position_error(id, e))?;
        Ok(state.liquidity)
    }

    async fn position(&self, id: PositionId) -> LedgerResult<RawPosition> {
        let state = self
            .manager
            .positions(id.as_u256())
            .call()
            .await
            .map_err(|e| position_error(id, e))?;

        Ok(RawPosition {
            token0: state.token0,
            token1: state.token1,
            fee: narrow("fee", state.fee)?,
            tick_lower: narrow("tickLower", state.tickLower)?,
            tick_upper: narrow("tickUpper", state.tickUpper)?,
            liquidity: state.liquidity,
            tokens_owed0: state.tokensOwed0,
            tokens_owed1: state.tokensOwed1,
        })
    }

    async fn resolve_symbol(&self, token: Address) -> LedgerResult<String> {
        let erc20 = IERC20Metadata::new(token, &self.provider);
        let symbol = erc20.symbol().call().await.map_err(call_error)?;
        Ok(symbol.trim().to_string())
    }

    async fn probe(&self) -> LedgerResult<()> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;
        debug!(expected = self.chain_id, actual, "Probed endpoint");
        if actual != self.chain_id {
            return Err(LedgerError::ChainMismatch {
                expected: self.chain_id,
                actual,
            });
        }
        Ok(())
    }
}
