//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Output formats accepted by [`LoggingConfig::format`].
pub const FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// `RUST_LOG` wins over the configured level. Logs go to stderr so that
    /// machine-readable command output on stdout stays clean.
    pub fn init(&self) {
        self.init_with_level(None);
    }

    /// Like [`init`](Self::init), with `level` replacing the configured level
    /// (used by the CLI's `--verbose`/`--quiet` flags).
    pub fn init_with_level(&self, level: Option<&str>) {
        let level = level.unwrap_or(&self.level);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

        // A subscriber may already be installed (tests, embedding); keep it.
        let _ = match self.format.as_str() {
            "json" => builder.json().try_init(),
            "compact" => builder.compact().try_init(),
            _ => builder.try_init(),
        };
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}
