//! Handler for the `networks` command.

use std::path::Path;

use serde_json::json;
use tabled::{Table, Tabled};

use super::output;
use crate::error::Result;
use crate::infrastructure::config::network::NetworkConfig;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Chain")]
    chain_id: u64,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Position Manager")]
    position_manager: String,
    #[tabled(rename = "Concurrency")]
    concurrency: usize,
    #[tabled(rename = "Batch")]
    batch: usize,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
}

impl From<&NetworkConfig> for NetworkRow {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            network: network.network.to_string(),
            name: network.name.clone(),
            chain_id: network.chain_id,
            protocol: network.protocol.clone(),
            position_manager: network.position_manager.to_checksum(None),
            concurrency: network.tuned_concurrency,
            batch: network.tuned_batch_size,
            enabled: if network.enabled { "yes" } else { "no" },
        }
    }
}

/// Execute `networks`.
pub fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)?;

    if output::is_json() {
        let networks: Vec<_> = config
            .networks
            .iter()
            .map(|n| {
                json!({
                    "network": n.network,
                    "name": n.name,
                    "chain_id": n.chain_id,
                    "rpc_url": n.rpc_url,
                    "protocol": n.protocol,
                    "position_manager": n.position_manager,
                    "factory": n.factory,
                    "tuned_concurrency": n.tuned_concurrency,
                    "tuned_batch_size": n.tuned_batch_size,
                    "enabled": n.enabled,
                })
            })
            .collect();
        output::json_output(json!({
            "command": "networks",
            "networks": networks,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Networks");
    println!();
    let rows: Vec<NetworkRow> = config.networks.iter().map(NetworkRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    println!();
    if config.concurrency.tune_for_network {
        output::hint("tuned concurrency and batch sizes apply (concurrency.tune_for_network)");
    } else {
        output::hint(&format!(
            "tuning disabled; every network uses concurrency {}",
            config.concurrency.max_concurrent_requests
        ));
    }
    Ok(())
}
