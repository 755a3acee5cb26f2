//! In-memory [`PositionLedger`] with scripted failures and latency.
//!
//! Every call is counted and the peak number of concurrent calls is
//! tracked, so tests can assert both what was called and how hard the
//! ledger was hit.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{address, Address};
use async_trait::async_trait;
use rand::Rng;

use crate::domain::{OwnerAddress, PositionId, RawPosition};
use crate::error::{LedgerError, LedgerResult};
use crate::port::PositionLedger;

pub const WBNB: Address = address!("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c");
pub const BSC_USDT: Address = address!("0x55d398326f99059fF775485246999027B3197955");

/// Liquidity given to positions built with [`MockLedgerBuilder::with_active`].
pub const ACTIVE_LIQUIDITY: u128 = 1_000_000;

/// Owner address whose last byte is `n`.
pub fn owner(n: u8) -> OwnerAddress {
    OwnerAddress::from(Address::with_last_byte(n))
}

/// Per-method call counters plus in-flight tracking.
#[derive(Debug, Default)]
pub struct CallStats {
    count: AtomicUsize,
    owned_at: AtomicUsize,
    liquidity: AtomicUsize,
    position: AtomicUsize,
    symbol: AtomicUsize,
    probe: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CallStats {
    pub fn count_calls(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn owned_at_calls(&self) -> usize {
        self.owned_at.load(Ordering::SeqCst)
    }

    pub fn liquidity_calls(&self) -> usize {
        self.liquidity.load(Ordering::SeqCst)
    }

    pub fn position_calls(&self) -> usize {
        self.position.load(Ordering::SeqCst)
    }

    pub fn symbol_calls(&self) -> usize {
        self.symbol.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> usize {
        self.probe.load(Ordering::SeqCst)
    }

    /// Highest number of calls observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.count_calls()
            + self.owned_at_calls()
            + self.liquidity_calls()
            + self.position_calls()
            + self.symbol_calls()
            + self.probe_calls()
    }

    fn enter(&self, counter: &AtomicUsize) -> InFlight<'_> {
        counter.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlight { stats: self }
    }
}

struct InFlight<'a> {
    stats: &'a CallStats,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted ledger.
#[derive(Debug)]
pub struct MockLedger {
    owners: HashMap<OwnerAddress, Vec<PositionId>>,
    positions: HashMap<PositionId, RawPosition>,
    symbols: HashMap<Address, String>,
    failing_indices: HashSet<u64>,
    failing_liquidity: HashSet<PositionId>,
    failing_positions: HashSet<PositionId>,
    failing_symbols: bool,
    failing_count: bool,
    reported_count: Option<u64>,
    unreachable: bool,
    probe_down: bool,
    latency_ms: Option<(u64, u64)>,
    stats: Arc<CallStats>,
}

impl MockLedger {
    pub fn builder() -> MockLedgerBuilder {
        MockLedgerBuilder::default()
    }

    /// A WBNB/USDT 0.25% position spanning ticks -600..600.
    pub fn raw_position(token0: Address, liquidity: u128) -> RawPosition {
        RawPosition {
            token0,
            token1: BSC_USDT,
            fee: 2500,
            tick_lower: -600,
            tick_upper: 600,
            liquidity,
            tokens_owed0: 0,
            tokens_owed1: 0,
        }
    }

    pub fn stats(&self) -> Arc<CallStats> {
        Arc::clone(&self.stats)
    }

    async fn delay(&self) {
        // ThreadRng is not Send; pick the delay before awaiting.
        let Some((min, max)) = self.latency_ms else {
            return;
        };
        let ms = rand::thread_rng().gen_range(min..=max);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn unreachable_error() -> LedgerError {
        LedgerError::Network("connection refused".to_string())
    }

    fn lookup(&self, id: PositionId) -> LedgerResult<&RawPosition> {
        self.positions
            .get(&id)
            .ok_or(LedgerError::UnknownResource(id))
    }
}

#[async_trait]
impl PositionLedger for MockLedger {
    async fn count_owned(&self, owner: &OwnerAddress) -> LedgerResult<u64> {
        let _guard = self.stats.enter(&self.stats.count);
        self.delay().await;
        if self.failing_count || self.unreachable {
            return Err(Self::unreachable_error());
        }
        if let Some(count) = self.reported_count {
            return Ok(count);
        }
        Ok(self.owners.get(owner).map_or(0, |ids| ids.len() as u64))
    }

    async fn owned_at(&self, owner: &OwnerAddress, index: u64) -> LedgerResult<PositionId> {
        let _guard = self.stats.enter(&self.stats.owned_at);
        self.delay().await;
        if self.unreachable || self.failing_indices.contains(&index) {
            return Err(Self::unreachable_error());
        }
        usize::try_from(index)
            .ok()
            .and_then(|i| self.owners.get(owner)?.get(i).copied())
            .ok_or_else(|| {
                LedgerError::Network("execution reverted: owner index out of bounds".to_string())
            })
    }

    async fn position_liquidity(&self, id: PositionId) -> LedgerResult<u128> {
        let _guard = self.stats.enter(&self.stats.liquidity);
        self.delay().await;
        if self.unreachable || self.failing_liquidity.contains(&id) {
            return Err(Self::unreachable_error());
        }
        self.lookup(id).map(|raw| raw.liquidity)
    }

    async fn position(&self, id: PositionId) -> LedgerResult<RawPosition> {
        let _guard = self.stats.enter(&self.stats.position);
        self.delay().await;
        if self.unreachable || self.failing_positions.contains(&id) {
            return Err(Self::unreachable_error());
        }
        self.lookup(id).copied()
    }

    async fn resolve_symbol(&self, token: Address) -> LedgerResult<String> {
        let _guard = self.stats.enter(&self.stats.symbol);
        self.delay().await;
        if self.unreachable || self.failing_symbols {
            return Err(Self::unreachable_error());
        }
        self.symbols
            .get(&token)
            .cloned()
            .ok_or_else(|| LedgerError::Decode("symbol() returned no data".to_string()))
    }

    async fn probe(&self) -> LedgerResult<()> {
        let _guard = self.stats.enter(&self.stats.probe);
        if self.unreachable || self.probe_down {
            return Err(Self::unreachable_error());
        }
        Ok(())
    }
}

/// Builder for [`MockLedger`].
#[derive(Debug, Default)]
pub struct MockLedgerBuilder {
    owners: HashMap<OwnerAddress, Vec<PositionId>>,
    positions: HashMap<PositionId, RawPosition>,
    symbols: HashMap<Address, String>,
    failing_indices: HashSet<u64>,
    failing_liquidity: HashSet<PositionId>,
    failing_positions: HashSet<PositionId>,
    failing_symbols: bool,
    failing_count: bool,
    reported_count: Option<u64>,
    unreachable: bool,
    probe_down: bool,
    latency_ms: Option<(u64, u64)>,
}

impl MockLedgerBuilder {
    /// Append a position to `owner`'s enumeration.
    pub fn with_position(mut self, owner: OwnerAddress, id: u64, raw: RawPosition) -> Self {
        let id = PositionId::from(id);
        self.owners.entry(owner).or_default().push(id);
        self.positions.insert(id, raw);
        self
    }

    pub fn with_active(self, owner: OwnerAddress, id: u64) -> Self {
        self.with_position(owner, id, MockLedger::raw_position(WBNB, ACTIVE_LIQUIDITY))
    }

    pub fn with_closed(self, owner: OwnerAddress, id: u64) -> Self {
        self.with_position(owner, id, MockLedger::raw_position(WBNB, 0))
    }

    pub fn with_symbol(mut self, token: Address, symbol: &str) -> Self {
        self.symbols.insert(token, symbol.to_string());
        self
    }

    /// Fail `owned_at` for this enumeration index, for every owner.
    pub fn failing_index(mut self, index: u64) -> Self {
        self.failing_indices.insert(index);
        self
    }

    pub fn failing_liquidity(mut self, id: u64) -> Self {
        self.failing_liquidity.insert(PositionId::from(id));
        self
    }

    pub fn failing_position(mut self, id: u64) -> Self {
        self.failing_positions.insert(PositionId::from(id));
        self
    }

    pub fn failing_symbols(mut self) -> Self {
        self.failing_symbols = true;
        self
    }

    pub fn failing_count(mut self) -> Self {
        self.failing_count = true;
        self
    }

    /// Answer `count_owned` with `count` for every owner, whatever the
    /// enumeration actually holds.
    pub fn reporting_count(mut self, count: u64) -> Self {
        self.reported_count = Some(count);
        self
    }

    /// Fail the probe and every data call.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Fail only the probe, leaving data calls untouched.
    pub fn unreachable_probe(mut self) -> Self {
        self.probe_down = true;
        self
    }

    /// Sleep a uniformly random `min..=max` milliseconds in every data call.
    pub fn with_latency_ms(mut self, min: u64, max: u64) -> Self {
        self.latency_ms = Some((min, max.max(min)));
        self
    }

    pub fn build(self) -> MockLedger {
        MockLedger {
            owners: self.owners,
            positions: self.positions,
            symbols: self.symbols,
            failing_indices: self.failing_indices,
            failing_liquidity: self.failing_liquidity,
            failing_positions: self.failing_positions,
            failing_symbols: self.failing_symbols,
            failing_count: self.failing_count,
            reported_count: self.reported_count,
            unreachable: self.unreachable,
            probe_down: self.probe_down,
            latency_ms: self.latency_ms,
            stats: Arc::new(CallStats::default()),
        }
    }
}
