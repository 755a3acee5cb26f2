//! Handler for the `positions` command.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::PositionsArgs;
use super::output;
use super::progress::TerminalProgress;
use crate::domain::{PipelineRunResult, Position};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Fee")]
    fee: String,
    #[tabled(rename = "Ticks")]
    ticks: String,
    #[tabled(rename = "Price Range")]
    range: String,
    #[tabled(rename = "Liquidity")]
    liquidity: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Position> for PositionRow {
    fn from(position: &Position) -> Self {
        Self {
            id: position.id.to_string(),
            pair: position.pair(),
            fee: position.fee_tier.to_string(),
            ticks: format!("{} .. {}", position.tick_lower, position.tick_upper),
            range: format!("{:.6} - {:.6}", position.price_lower, position.price_upper),
            liquidity: position.liquidity.to_string(),
            status: position.status.to_string(),
        }
    }
}

/// Execute `positions`.
pub async fn execute(config_path: &Path, args: PositionsArgs) -> Result<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = config.concurrency.with_concurrency(concurrency);
    }

    let progress = Arc::new(TerminalProgress::new());
    let pipeline = bootstrap::build_evm_pipeline(&config)?.with_progress(progress.clone());
    let route = pipeline.route(args.network)?;

    if !output::is_json() {
        output::header(env!("CARGO_PKG_VERSION"));
        output::field("Owner", &args.owner);
        output::field("Network", args.network);
        output::field("Endpoint", output::muted(&route.endpoint.rpc_url));
        output::field("Concurrency", route.stages.concurrency);
        output::field("Active only", !args.all);
        println!();
    }

    let result = pipeline
        .discover_positions(&args.owner, args.network, !args.all)
        .await;
    progress.finish();
    let result = result?;

    if output::is_json() {
        output::json_output(json!({
            "command": "positions",
            "result": serde_json::to_value(&result)?,
        }));
        return Ok(());
    }

    display(&result);
    Ok(())
}

fn display(result: &PipelineRunResult) {
    output::section("Positions");
    if result.is_empty() {
        output::note("No positions found");
    } else {
        let rows: Vec<PositionRow> = result.positions.iter().map(PositionRow::from).collect();
        println!();
        output::lines(&Table::new(rows).to_string());
    }

    let counts = &result.counts;
    output::section("Summary");
    output::field("Owned", counts.owned);
    output::field("Discovered", counts.discovered);
    if result.active_only {
        output::field("Live", counts.live);
    }
    output::field("Enriched", counts.enriched);
    output::field("Active", result.active_count());
    output::field("Success rate", format!("{:.1}%", result.success_rate));
    let failures = counts.discovery_failures + counts.filter_failures + counts.enrichment_failures;
    if failures > 0 {
        output::warning(&format!(
            "{failures} lookups failed (discovery {}, filter {}, enrichment {})",
            counts.discovery_failures, counts.filter_failures, counts.enrichment_failures
        ));
    }
    if counts.filter_failed_open {
        output::warning("Liveness filter unavailable; closed positions may be listed");
    }

    output::section("Timing");
    output::field("Discovery", output::seconds(result.timings.discovery.as_secs_f64()));
    if let Some(filter) = result.timings.filter {
        output::field("Filter", output::seconds(filter.as_secs_f64()));
    }
    output::field("Enrichment", output::seconds(result.timings.enrichment.as_secs_f64()));
    output::field("Total", output::seconds(result.timings.total.as_secs_f64()));

    if !result.throughput.stages.is_empty() {
        output::section("Throughput");
        for stage in &result.throughput.stages {
            let ratio = stage
                .improvement_ratio()
                .map_or_else(|| "n/a".to_string(), |r| format!("{r:.1}x"));
            output::field(
                &stage.stage.to_string(),
                format!(
                    "{} vs {} sequential ({})",
                    output::seconds(stage.actual.as_secs_f64()),
                    output::seconds(stage.baseline.as_secs_f64()),
                    output::positive(ratio)
                ),
            );
        }
    }

    output::section("Run");
    output::field("Run ID", output::muted(result.run_id));
    output::field("Started", result.started_at.to_rfc3339());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeeTier, Network, PositionId, RawPosition, TokenSymbols};
    use alloy_primitives::Address;

    #[test]
    fn row_formats_position() {
        let raw = RawPosition {
            token0: Address::with_last_byte(1),
            token1: Address::with_last_byte(2),
            fee: FeeTier::Medium.raw(),
            tick_lower: -600,
            tick_upper: 600,
            liquidity: 42,
            tokens_owed0: 0,
            tokens_owed1: 0,
        };
        let symbols = TokenSymbols {
            token0: "WBNB".to_string(),
            token1: "USDT".to_string(),
        };
        let position =
            Position::from_raw(PositionId::from(7u64), Network::Bsc, raw, symbols).unwrap();
        let row = PositionRow::from(&position);

        assert_eq!(row.id, "7");
        assert_eq!(row.pair, "WBNB/USDT");
        assert_eq!(row.ticks, "-600 .. 600");
        assert_eq!(row.liquidity, "42");
        assert_eq!(row.status, "active");
    }
}
