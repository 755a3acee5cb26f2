//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use super::output;
use crate::error::Result;
use crate::infrastructure::config::network::rpc_url_env_key;
use crate::infrastructure::config::settings::Config;

fn source_label(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    }
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load_or_default(path)?;

    if output::is_json() {
        let networks: Vec<_> = config
            .networks
            .iter()
            .map(|n| {
                json!({
                    "network": n.network,
                    "rpc_url": n.rpc_url,
                    "enabled": n.enabled,
                })
            })
            .collect();
        output::json_output(json!({
            "command": "config.show",
            "path": path.display().to_string(),
            "logging": { "level": config.logging.level, "format": config.logging.format },
            "concurrency": {
                "max_concurrent_requests": config.concurrency.max_concurrent_requests,
                "discovery_batch_size": config.concurrency.discovery_batch_size,
                "filter_batch_size": config.concurrency.filter_batch_size,
                "enrichment_batch_size": config.concurrency.enrichment_batch_size,
                "tune_for_network": config.concurrency.tune_for_network,
            },
            "pipeline": {
                "deadline_secs": config.pipeline.deadline_secs,
                "empty_on_total_discovery_failure": config.pipeline.empty_on_total_discovery_failure,
            },
            "networks": networks,
            "symbols": config.symbols,
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Source", source_label(path));

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    let concurrency = &config.concurrency;
    output::section("Concurrency");
    output::field("Max requests", concurrency.max_concurrent_requests);
    output::field("Discovery batch", concurrency.discovery_batch_size);
    output::field("Filter batch", concurrency.filter_batch_size);
    output::field("Enrichment batch", concurrency.enrichment_batch_size);
    output::field(
        "Network tuning",
        if concurrency.tune_for_network {
            "enabled"
        } else {
            "disabled"
        },
    );

    output::section("Pipeline");
    output::field(
        "Deadline",
        config
            .pipeline
            .deadline_secs
            .map_or_else(|| "none".to_string(), |s| format!("{s}s")),
    );
    output::field(
        "Empty on failure",
        config.pipeline.empty_on_total_discovery_failure,
    );
    output::field(
        "Call costs",
        format!(
            "{}ms / {}ms / {}ms",
            config.pipeline.discovery_cost_ms,
            config.pipeline.filter_cost_ms,
            config.pipeline.enrichment_cost_ms
        ),
    );

    output::section("Networks");
    for network in config.networks.iter() {
        let state = if network.enabled {
            output::positive("enabled")
        } else {
            output::negative("disabled")
        };
        output::field(network.network.as_str(), format!("{} ({state})", network.rpc_url));
    }
    output::hint(&format!(
        "override RPC URLs with {} and friends",
        rpc_url_env_key(crate::domain::Network::Bsc)
    ));

    if !config.symbols.is_empty() {
        output::section("Extra Symbols");
        for (address, symbol) in &config.symbols {
            output::field(symbol, address);
        }
    }

    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config = Config::load_or_default(path)?;
    let enabled = config.networks.enabled().count();

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
            "enabled_networks": enabled,
        }));
        return Ok(());
    }

    output::section("Config Validation");
    output::field("Path", source_label(path));
    output::success("Configuration is valid");
    output::field("Networks", format!("{enabled} enabled"));
    if enabled == 0 {
        output::warning("No networks enabled; `positions` will refuse every network");
    }
    Ok(())
}
