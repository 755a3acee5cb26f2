//! Connector producing [`EvmLedger`]s.

use std::sync::Arc;

use tracing::info;

use super::ledger::EvmLedger;
use crate::domain::LedgerEndpoint;
use crate::error::Result;
use crate::port::{LedgerConnector, PositionLedger};

#[derive(Debug, Default, Clone, Copy)]
pub struct EvmConnector;

impl EvmConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LedgerConnector for EvmConnector {
    fn connect(&self, endpoint: &LedgerEndpoint) -> Result<Arc<dyn PositionLedger>> {
        let ledger = EvmLedger::new(endpoint)?;
        info!(
            network = %endpoint.network,
            chain_id = endpoint.chain_id,
            position_manager = %endpoint.position_manager,
            "Connected to position manager"
        );
        Ok(Arc::new(ledger))
    }
}
