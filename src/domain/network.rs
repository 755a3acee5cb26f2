//! Network and pipeline stage selectors.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Supported ledgers.
///
/// Each variant maps to one entry of the
/// [`NetworkRegistry`](crate::infrastructure::config::network::NetworkRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// BNB Smart Chain (PancakeSwap V3).
    Bsc,
    /// Ethereum mainnet (Uniswap V3).
    Ethereum,
    /// Polygon PoS (Uniswap V3).
    Polygon,
    /// Arbitrum One (Uniswap V3).
    Arbitrum,
}

impl Network {
    /// All supported networks, in display order.
    pub const ALL: [Self; 4] = [Self::Bsc, Self::Ethereum, Self::Polygon, Self::Arbitrum];

    /// Lowercase identifier used in config keys and CLI arguments.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bsc => "bsc",
            Self::Ethereum => "ethereum",
            Self::Polygon => "polygon",
            Self::Arbitrum => "arbitrum",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bsc" | "bnb" => Ok(Self::Bsc),
            "ethereum" | "eth" => Ok(Self::Ethereum),
            "polygon" | "matic" => Ok(Self::Polygon),
            "arbitrum" | "arb" => Ok(Self::Arbitrum),
            _ => Err(ConfigError::UnknownNetwork {
                name: s.to_string(),
            }),
        }
    }
}

/// Where and how to reach one network's position manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEndpoint {
    pub network: Network,
    pub chain_id: u64,
    pub rpc_url: String,
    pub position_manager: Address,
}

/// Pipeline stage, used for logging, progress and error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Discovery,
    Filter,
    Enrichment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discovery => "discovery",
            Self::Filter => "filter",
            Self::Enrichment => "enrichment",
        };
        f.write_str(name)
    }
}
