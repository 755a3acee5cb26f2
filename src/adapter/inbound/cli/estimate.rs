//! Handler for the `estimate` command.

use std::path::Path;

use serde_json::json;

use super::command::EstimateArgs;
use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Execute `estimate`. Makes no remote calls.
pub fn execute(config_path: &Path, args: &EstimateArgs) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = config.concurrency.with_concurrency(concurrency);
    }
    let pipeline = bootstrap::build_evm_pipeline(&config)?;
    let estimate = pipeline.estimate(args.positions, args.network)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "estimate",
            "network": args.network,
            "estimate": estimate,
            "sequential_total_secs": estimate.sequential_total_secs(),
            "concurrent_total_secs": estimate.concurrent_total_secs(),
            "time_saved_secs": estimate.time_saved_secs(),
            "improvement_percent": estimate.improvement_percent(),
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Network", args.network);
    output::field("Positions", estimate.positions);
    output::field("Concurrency", estimate.concurrency);

    output::section("Sequential");
    output::field("Discovery", output::seconds(estimate.sequential_discovery_secs));
    output::field("Enrichment", output::seconds(estimate.sequential_enrichment_secs));
    output::field("Total", output::seconds(estimate.sequential_total_secs()));

    output::section("Concurrent");
    output::field("Discovery", output::seconds(estimate.concurrent_discovery_secs));
    output::field("Enrichment", output::seconds(estimate.concurrent_enrichment_secs));
    output::field("Total", output::seconds(estimate.concurrent_total_secs()));

    output::section("Savings");
    output::field("Time saved", output::positive(output::seconds(estimate.time_saved_secs())));
    output::field(
        "Improvement",
        output::positive(format!("{:.1}%", estimate.improvement_percent())),
    );
    Ok(())
}
