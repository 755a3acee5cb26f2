//! Token symbol resolution with caching and fallbacks.
//!
//! Resolution order: run cache, ledger `symbol()` call, static known-token
//! table, then a synthetic `Token_0x1234` label. Symbol lookup never fails.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{address, Address};
use dashmap::DashMap;
use tracing::debug;

use crate::domain::TokenSymbols;
use crate::port::PositionLedger;

/// Well-known tokens used when the ledger cannot answer `symbol()`.
const KNOWN_TOKENS: &[(Address, &str)] = &[
    // BNB Smart Chain
    (address!("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"), "WBNB"),
    (address!("0x55d398326f99059fF775485246999027B3197955"), "USDT"),
    (address!("0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56"), "BUSD"),
    (address!("0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"), "USDC"),
    (address!("0x2170Ed0880ac9A755fd29B2688956BD959F933F8"), "ETH"),
    (address!("0x7130d2A12B9BCbFAe4f2634d864A1Ee1Ce3Ead9c"), "BTCB"),
    // Ethereum
    (address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), "WETH"),
    (address!("0xdAC17F958D2ee523a2206206994597C13D831ec7"), "USDT"),
    (address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), "USDC"),
    (address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"), "DAI"),
    (address!("0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"), "WBTC"),
];

/// Static address → symbol table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<Address, String>,
}

impl SymbolTable {
    /// Table preloaded with the built-in known tokens.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = KNOWN_TOKENS
            .iter()
            .map(|(address, symbol)| (*address, (*symbol).to_string()))
            .collect();
        Self { entries }
    }

    /// Add or replace entries; later entries win.
    #[must_use]
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = (Address, String)>) -> Self {
        self.entries.extend(entries);
        self
    }

    #[must_use]
    pub fn lookup(&self, token: &Address) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deterministic label for a token nobody could name, e.g. `Token_0xbb4C`.
#[must_use]
pub fn fallback_label(token: &Address) -> String {
    let checksummed = token.to_checksum(None);
    format!("Token_{}", &checksummed[..6])
}

/// Resolves token symbols for one run.
///
/// Clones share the cache, so concurrent units never resolve the same token
/// twice once an answer is in.
#[derive(Clone)]
pub struct SymbolResolver {
    ledger: Arc<dyn PositionLedger>,
    table: Arc<SymbolTable>,
    cache: Arc<DashMap<Address, String>>,
}

impl SymbolResolver {
    #[must_use]
    pub fn new(ledger: Arc<dyn PositionLedger>, table: Arc<SymbolTable>) -> Self {
        Self {
            ledger,
            table,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Resolve one token's symbol. Never fails.
    pub async fn resolve(&self, token: Address) -> String {
        if let Some(hit) = self.cache.get(&token) {
            return hit.value().clone();
        }

        let symbol = match self.ledger.resolve_symbol(token).await {
            Ok(symbol) if !symbol.trim().is_empty() => symbol,
            Ok(_) => self.fallback(&token),
            Err(err) => {
                debug!(token = %token, error = %err, "Symbol lookup failed, using fallback");
                self.fallback(&token)
            }
        };

        self.cache.insert(token, symbol.clone());
        symbol
    }

    /// Resolve both tokens of a pair, one after the other. One executor
    /// permit covers one remote call at a time.
    pub async fn resolve_pair(&self, token0: Address, token1: Address) -> TokenSymbols {
        let token0 = self.resolve(token0).await;
        let token1 = self.resolve(token1).await;
        TokenSymbols { token0, token1 }
    }

    /// Distinct tokens resolved so far.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn fallback(&self, token: &Address) -> String {
        self.table
            .lookup(token)
            .map_or_else(|| fallback_label(token), str::to_string)
    }
}
