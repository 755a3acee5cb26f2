//! Command-line adapter: argument parsing, handlers and terminal output.

pub mod command;
pub mod config;
pub mod estimate;
pub mod networks;
pub mod output;
pub mod positions;
pub mod progress;

use command::{Cli, Commands, ConfigCommand};

use crate::error::Result;

/// Dispatch a parsed command line to its handler.
///
/// # Errors
///
/// Returns the handler's error; the binary prints it and exits non-zero.
pub async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.as_path();
    match cli.command {
        Commands::Positions(args) => positions::execute(path, args).await,
        Commands::Networks => networks::execute(path),
        Commands::Estimate(args) => estimate::execute(path, &args),
        Commands::Config(ConfigCommand::Show) => config::execute_show(path),
        Commands::Config(ConfigCommand::Validate) => config::execute_validate(path),
    }
}
