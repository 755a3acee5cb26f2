//! Per-network endpoint configuration.
//!
//! Every [`Network`] has a built-in entry (chain id, public RPC endpoint,
//! position manager and factory addresses, tuned concurrency). A `[networks.*]`
//! table in the config file overrides individual fields, and
//! `LPSCAN_<NETWORK>_RPC_URL` overrides the RPC URL last.

use std::collections::BTreeMap;

use alloy_primitives::{address, Address};
use serde::Deserialize;

use crate::domain::{LedgerEndpoint, Network};
use crate::error::ConfigError;

const PANCAKE_POSITION_MANAGER: Address = address!("0x46A15B0b27311cedF172AB29E4f4766fbE7F4364");
const PANCAKE_FACTORY: Address = address!("0x0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865");
const UNISWAP_POSITION_MANAGER: Address = address!("0xC36442b4a4522E871399CD717aBDD847Ab11FE88");
const UNISWAP_FACTORY: Address = address!("0x1F98431c8aD98523631AE4a59f267346ea31F984");

/// Resolved settings for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    /// Human-readable name, e.g. "BNB Smart Chain".
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    /// `NonfungiblePositionManager` contract.
    pub position_manager: Address,
    /// Pool factory; informational, not queried by the pipeline.
    pub factory: Address,
    /// Protocol label, e.g. "PancakeSwap V3".
    pub protocol: String,
    pub enabled: bool,
    /// Concurrency tuned for this endpoint's rate limits.
    pub tuned_concurrency: usize,
    /// Discovery and filter chunk size tuned for this endpoint.
    pub tuned_batch_size: usize,
}

impl NetworkConfig {
    /// Built-in settings for `network`.
    #[must_use]
    pub fn builtin(network: Network) -> Self {
        let (name, chain_id, rpc_url, protocol, tuned_concurrency, tuned_batch_size) =
            match network {
                Network::Bsc => (
                    "BNB Smart Chain",
                    56,
                    "https://bsc-dataseed1.binance.org/",
                    "PancakeSwap V3",
                    15,
                    150,
                ),
                Network::Ethereum => (
                    "Ethereum",
                    1,
                    "https://eth.llamarpc.com",
                    "Uniswap V3",
                    8,
                    80,
                ),
                Network::Polygon => (
                    "Polygon",
                    137,
                    "https://polygon-rpc.com",
                    "Uniswap V3",
                    12,
                    120,
                ),
                Network::Arbitrum => (
                    "Arbitrum One",
                    42161,
                    "https://arb1.arbitrum.io/rpc",
                    "Uniswap V3",
                    12,
                    120,
                ),
            };
        let (position_manager, factory) = match network {
            Network::Bsc => (PANCAKE_POSITION_MANAGER, PANCAKE_FACTORY),
            _ => (UNISWAP_POSITION_MANAGER, UNISWAP_FACTORY),
        };

        Self {
            network,
            name: name.to_string(),
            chain_id,
            rpc_url: rpc_url.to_string(),
            position_manager,
            factory,
            protocol: protocol.to_string(),
            enabled: true,
            tuned_concurrency,
            tuned_batch_size,
        }
    }

    /// The subset the ledger connector needs.
    #[must_use]
    pub fn endpoint(&self) -> LedgerEndpoint {
        LedgerEndpoint {
            network: self.network,
            chain_id: self.chain_id,
            rpc_url: self.rpc_url.clone(),
            position_manager: self.position_manager,
        }
    }

    fn apply(&mut self, overrides: NetworkOverride) {
        if let Some(name) = overrides.name {
            self.name = name;
        }
        if let Some(chain_id) = overrides.chain_id {
            self.chain_id = chain_id;
        }
        if let Some(rpc_url) = overrides.rpc_url {
            self.rpc_url = rpc_url;
        }
        if let Some(position_manager) = overrides.position_manager {
            self.position_manager = position_manager;
        }
        if let Some(factory) = overrides.factory {
            self.factory = factory;
        }
        if let Some(protocol) = overrides.protocol {
            self.protocol = protocol;
        }
        if let Some(enabled) = overrides.enabled {
            self.enabled = enabled;
        }
        if let Some(concurrency) = overrides.max_concurrent_requests {
            self.tuned_concurrency = concurrency;
        }
        if let Some(batch_size) = overrides.batch_size {
            self.tuned_batch_size = batch_size;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" });
        }
        let url = url::Url::parse(&self.rpc_url).map_err(|e| ConfigError::InvalidValue {
            field: "rpc_url",
            reason: format!("{}: {e}", self.network),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "rpc_url",
                reason: format!("{}: scheme must be http or https", self.network),
            });
        }
        if self.chain_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chain_id",
                reason: format!("{}: must be greater than 0", self.network),
            });
        }
        if self.position_manager == Address::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "position_manager",
                reason: format!("{}: must not be the zero address", self.network),
            });
        }
        if self.tuned_concurrency == 0 || self.tuned_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "networks",
                reason: format!("{}: tuned concurrency and batch size must be greater than 0", self.network),
            });
        }
        Ok(())
    }
}

/// Partial `[networks.<name>]` table; unset fields keep the built-in value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkOverride {
    pub name: Option<String>,
    pub chain_id: Option<u64>,
    pub rpc_url: Option<String>,
    pub position_manager: Option<Address>,
    pub factory: Option<Address>,
    pub protocol: Option<String>,
    pub enabled: Option<bool>,
    pub max_concurrent_requests: Option<usize>,
    pub batch_size: Option<usize>,
}

/// All known networks with overrides applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<Network, NetworkOverride>")]
pub struct NetworkRegistry {
    networks: BTreeMap<Network, NetworkConfig>,
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<Network, NetworkOverride>> for NetworkRegistry {
    fn from(overrides: BTreeMap<Network, NetworkOverride>) -> Self {
        let mut networks: BTreeMap<Network, NetworkConfig> = Network::ALL
            .into_iter()
            .map(|network| (network, NetworkConfig::builtin(network)))
            .collect();
        for (network, overrides) in overrides {
            if let Some(config) = networks.get_mut(&network) {
                config.apply(overrides);
            }
        }
        Self { networks }
    }
}

impl NetworkRegistry {
    /// Look up an enabled network.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NetworkDisabled`] for a network switched off in
    /// configuration, [`ConfigError::UnknownNetwork`] if it has no entry.
    pub fn resolve(&self, network: Network) -> Result<&NetworkConfig, ConfigError> {
        let config = self
            .networks
            .get(&network)
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: network.to_string(),
            })?;
        if !config.enabled {
            return Err(ConfigError::NetworkDisabled {
                network: network.to_string(),
            });
        }
        Ok(config)
    }

    /// Parse a network name and resolve it.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve); unknown names fail with
    /// [`ConfigError::UnknownNetwork`].
    pub fn resolve_name(&self, name: &str) -> Result<&NetworkConfig, ConfigError> {
        self.resolve(name.parse()?)
    }

    /// Every network, enabled or not, in display order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.values()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.iter().filter(|config| config.enabled)
    }

    /// Replace RPC URLs from `LPSCAN_<NETWORK>_RPC_URL` variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for config in self.networks.values_mut() {
            let key = rpc_url_env_key(config.network);
            if let Some(url) = lookup(&key).filter(|url| !url.trim().is_empty()) {
                config.rpc_url = url;
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.enabled().try_for_each(NetworkConfig::validate)
    }
}

/// Environment variable holding the RPC URL override for `network`.
#[must_use]
pub fn rpc_url_env_key(network: Network) -> String {
    format!("LPSCAN_{}_RPC_URL", network.as_str().to_ascii_uppercase())
}
