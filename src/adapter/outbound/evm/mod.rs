//! EVM JSON-RPC adapter for the position ledger port.

mod connector;
mod contracts;
mod ledger;

pub use connector::EvmConnector;
pub use ledger::EvmLedger;
