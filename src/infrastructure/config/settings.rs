//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; RPC URLs can be overridden with
//! `LPSCAN_<NETWORK>_RPC_URL` environment variables.
//!
//! # Example
//!
//! ```no_run
//! use lpscan::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("lpscan.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use alloy_primitives::Address;
use serde::Deserialize;

use super::logging::{LoggingConfig, FORMATS};
use super::network::NetworkRegistry;
use super::pipeline::{ConcurrencyConfig, PipelineConfig};
use crate::application::SymbolTable;
use crate::domain::parse_address;
use crate::error::{ConfigError, Result};

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_PATH: &str = "lpscan.toml";

/// Main application configuration.
///
/// Every section is optional; an empty file yields the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Concurrency bound and batch sizes.
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    /// Deadline, failure policy and cost model.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Per-network overrides on top of the built-in registry.
    #[serde(default)]
    pub networks: NetworkRegistry,

    /// Extra known tokens (`address = "SYMBOL"`) used when a token's
    /// `symbol()` call fails.
    #[serde(default)]
    pub symbols: BTreeMap<String, String>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Environment overrides are applied before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., a zero batch size)
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.networks.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults
    /// (still honouring environment overrides).
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) when the file exists.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        Self::parse_toml("")
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "level" }.into());
        }
        if !FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: format!("must be one of {}", FORMATS.join(", ")),
            }
            .into());
        }

        self.concurrency.validate()?;
        self.pipeline.validate()?;
        self.networks.validate()?;
        self.symbol_entries()?;
        Ok(())
    }

    /// Configured extra tokens as typed entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed address or an
    /// empty symbol.
    pub fn symbol_entries(&self) -> std::result::Result<Vec<(Address, String)>, ConfigError> {
        self.symbols
            .iter()
            .map(|(address, symbol)| {
                let address = parse_address(address).map_err(|e| ConfigError::InvalidValue {
                    field: "symbols",
                    reason: e.to_string(),
                })?;
                if symbol.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "symbols",
                        reason: format!("empty symbol for {address}"),
                    });
                }
                Ok((address, symbol.trim().to_string()))
            })
            .collect()
    }

    /// Built-in known tokens extended with the `[symbols]` table.
    ///
    /// # Errors
    ///
    /// See [`symbol_entries`](Self::symbol_entries).
    pub fn symbol_table(&self) -> std::result::Result<SymbolTable, ConfigError> {
        Ok(SymbolTable::builtin().with_entries(self.symbol_entries()?))
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
