//! Command-line interface definitions.
//!
//! Defines the CLI structure for the lpscan binary using `clap`. Every
//! subcommand reads the same optional configuration file; network data the
//! file does not override comes from the built-in registry.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Network;
use crate::infrastructure::config::settings::DEFAULT_CONFIG_PATH;

/// Concurrent discovery of concentrated-liquidity positions
#[derive(Parser, Debug)]
#[command(name = "lpscan")]
#[command(version, about)]
pub struct Cli {
    /// Path to the configuration file (built-in defaults when missing)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level implied by `--quiet`/`--verbose`, if any.
    #[must_use]
    pub fn log_level(&self) -> Option<&'static str> {
        match (self.quiet, self.verbose) {
            (true, _) => Some("warn"),
            (false, 0) => None,
            (false, 1) => Some("debug"),
            (false, _) => Some("trace"),
        }
    }
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover and enrich the positions held by an owner
    Positions(PositionsArgs),

    /// List configured networks
    Networks,

    /// Estimate sequential versus concurrent run time
    Estimate(EstimateArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `lpscan config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration file.
    Validate,
}

/// Arguments for the `positions` subcommand.
#[derive(Parser, Debug)]
pub struct PositionsArgs {
    /// Owner address (0x-prefixed, 40 hex digits)
    pub owner: String,

    /// Network to query
    #[arg(short, long, default_value = "bsc")]
    pub network: Network,

    /// Include closed positions (zero liquidity)
    #[arg(long)]
    pub all: bool,

    /// Maximum concurrent requests; disables per-network tuning
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Arguments for the `estimate` subcommand.
#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Number of positions to estimate for
    pub positions: usize,

    /// Maximum concurrent requests; defaults to the network's setting
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Network whose settings to use
    #[arg(short, long, default_value = "bsc")]
    pub network: Network,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_command_factory_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_has_version() {
        let cmd = Cli::command();
        assert!(cmd.get_version().is_some());
        assert_eq!(cmd.get_name(), "lpscan");
    }

    #[test]
    fn test_parse_positions_defaults() {
        let cli = Cli::try_parse_from([
            "lpscan",
            "positions",
            "0x000000000000000000000000000000000000000a",
        ])
        .unwrap();
        let Commands::Positions(args) = cli.command else {
            panic!("expected positions command");
        };
        assert_eq!(args.network, Network::Bsc);
        assert!(!args.all);
        assert_eq!(args.concurrency, None);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_parse_positions_flags() {
        let cli = Cli::try_parse_from([
            "lpscan",
            "positions",
            "0xabc",
            "--network",
            "ethereum",
            "--all",
            "--concurrency",
            "4",
        ])
        .unwrap();
        let Commands::Positions(args) = cli.command else {
            panic!("expected positions command");
        };
        assert_eq!(args.network, Network::Ethereum);
        assert!(args.all);
        assert_eq!(args.concurrency, Some(4));
    }

    #[test]
    fn test_parse_rejects_unknown_network() {
        let result = Cli::try_parse_from(["lpscan", "positions", "0xabc", "-n", "solana"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lpscan", "networks", "--json", "-c", "other.toml"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.color, ColorChoice::Auto));
    }

    #[test]
    fn test_parse_estimate() {
        let cli = Cli::try_parse_from(["lpscan", "estimate", "100", "--concurrency", "10"]).unwrap();
        let Commands::Estimate(args) = cli.command else {
            panic!("expected estimate command");
        };
        assert_eq!(args.positions, 100);
        assert_eq!(args.concurrency, Some(10));
    }

    #[test]
    fn test_parse_config_subcommands() {
        let cli = Cli::try_parse_from(["lpscan", "config", "validate"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Validate)));
    }

    #[test]
    fn test_log_level_from_flags() {
        let quiet = Cli::try_parse_from(["lpscan", "-q", "networks"]).unwrap();
        assert_eq!(quiet.log_level(), Some("warn"));
        let verbose = Cli::try_parse_from(["lpscan", "-vv", "networks"]).unwrap();
        assert_eq!(verbose.log_level(), Some("trace"));
        let normal = Cli::try_parse_from(["lpscan", "networks"]).unwrap();
        assert_eq!(normal.log_level(), None);
    }
}
