use std::process::ExitCode;

use clap::Parser;

use lpscan::adapter::inbound::cli::command::Cli;
use lpscan::adapter::inbound::cli::output::{self, OutputConfig};
use lpscan::adapter::inbound::cli::run;
use lpscan::infrastructure::config::logging::LoggingConfig;
use lpscan::infrastructure::config::settings::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    // Both ring and aws-lc may be linked; pick one before any TLS use.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet));
    output::set_color(&cli.color);

    // A broken config file is reported by the command itself.
    let logging = Config::load_or_default(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    logging.init_with_level(cli.log_level());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
