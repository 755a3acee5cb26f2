//! Configuration loading from files on disk.

use std::fs;
use std::path::PathBuf;

use lpscan::domain::Network;
use lpscan::error::{ConfigError, Error};
use lpscan::infrastructure::bootstrap;
use lpscan::infrastructure::config::settings::Config;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("lpscan.toml");
    fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn load_reads_every_section() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[logging]
level = "warn"
format = "compact"

[concurrency]
max_concurrent_requests = 6
discovery_batch_size = 30
tune_for_network = false

[pipeline]
deadline_secs = 90
enrichment_cost_ms = 250

[networks.bsc]
rpc_url = "https://bsc.example.org"
max_concurrent_requests = 20

[networks.arbitrum]
enabled = false
"#,
    );

    let config = Config::load(&path).unwrap();

    assert_eq!(config.logging.format, "compact");
    assert_eq!(config.concurrency.max_concurrent_requests, 6);
    assert_eq!(config.pipeline.deadline_secs, Some(90));
    let bsc = config.networks.resolve(Network::Bsc).unwrap();
    assert_eq!(bsc.tuned_concurrency, 20);
    assert!(config.networks.resolve(Network::Arbitrum).is_err());

    let routes = bootstrap::routes(&config);
    assert_eq!(routes.len(), 3);
    let route = &routes[&Network::Bsc];
    assert_eq!(route.stages.concurrency, 6);
    assert_eq!(route.stages.discovery_batch_size, 30);
    assert_eq!(route.endpoint.chain_id, 56);

    let settings = bootstrap::pipeline_settings(&config);
    assert_eq!(settings.costs.enrichment.as_millis(), 250);
}

#[test]
fn load_rejects_zero_batch_size() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[concurrency]\nfilter_batch_size = 0\n");

    match Config::load(&path) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "filter_batch_size",
            ..
        })) => {}
        Err(err) => panic!("expected invalid batch size, got {err}"),
        Ok(_) => panic!("expected invalid batch size"),
    }
}

#[test]
fn load_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[concurrency\nmax = ");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn load_rejects_unknown_network_field() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[networks.bsc]\nrpc = \"https://x.example\"\n");

    assert!(Config::load(&path).is_err());
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.networks.enabled().count(), Network::ALL.len());
    assert!(config.concurrency.tune_for_network);
}

#[test]
fn non_http_rpc_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[networks.ethereum]\nrpc_url = \"ftp://eth.example\"\n");

    match Config::load(&path) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, "rpc_url");
        }
        other => panic!("expected invalid rpc_url, got {other:?}"),
    }
}
