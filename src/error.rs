use std::time::Duration;

use thiserror::Error;

use crate::domain::{PositionId, Stage};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown network '{name}'")]
    UnknownNetwork { name: String },

    #[error("network '{network}' is disabled in configuration")]
    NetworkDisabled { network: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failure of a single remote ledger call.
///
/// Stages recover these locally (exclude, default or substitute); they only
/// reach the caller wrapped in [`Error::StageUnavailable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("unknown position {0}")]
    UnknownResource(PositionId),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("chain id mismatch: expected {expected}, endpoint reports {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("task aborted: {0}")]
    Aborted(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("{stage} stage unavailable: {source}")]
    StageUnavailable {
        stage: Stage,
        #[source]
        source: LedgerError,
    },

    #[error("deadline exceeded during {stage} after {elapsed:?}")]
    DeadlineExceeded { stage: Stage, elapsed: Duration },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a single ledger call.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl Error {
    /// Wrap a ledger failure as a stage-wide outage.
    #[must_use]
    pub fn unavailable(stage: Stage, source: LedgerError) -> Self {
        Self::StageUnavailable { stage, source }
    }
}
