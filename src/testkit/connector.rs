//! [`LedgerConnector`] handing out a shared mock ledger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::ledger::MockLedger;
use crate::domain::{LedgerEndpoint, Network};
use crate::error::Result;
use crate::port::{LedgerConnector, PositionLedger};

/// Returns the same [`MockLedger`] for every endpoint and records which
/// networks were connected.
#[derive(Debug)]
pub struct MockConnector {
    ledger: Arc<MockLedger>,
    connects: AtomicUsize,
    networks: Mutex<Vec<Network>>,
}

impl MockConnector {
    pub fn new(ledger: MockLedger) -> Self {
        Self::shared(Arc::new(ledger))
    }

    pub fn shared(ledger: Arc<MockLedger>) -> Self {
        Self {
            ledger,
            connects: AtomicUsize::new(0),
            networks: Mutex::new(Vec::new()),
        }
    }

    pub fn ledger(&self) -> Arc<MockLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn networks(&self) -> Vec<Network> {
        self.networks.lock().clone()
    }
}

impl LedgerConnector for MockConnector {
    fn connect(&self, endpoint: &LedgerEndpoint) -> Result<Arc<dyn PositionLedger>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.networks.lock().push(endpoint.network);
        let ledger: Arc<dyn PositionLedger> = self.ledger.clone();
        Ok(ledger)
    }
}
