//! Liquidity position records.
//!
//! [`RawPosition`] is the decoded `positions(tokenId)` tuple as the ledger
//! returns it. [`Position`] is the enriched, immutable record produced once
//! per pipeline run, with derived prices, fee percentage and status.

use std::fmt;

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use super::id::PositionId;
use super::network::Network;
use super::tick::{price_at_tick, validate_range};
use crate::error::LedgerError;

/// Pool fee tier in hundredths of a basis point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.25% (PancakeSwap)
    Medium,
    /// 0.3% (Uniswap)
    Standard,
    /// 1%
    High,
}

impl FeeTier {
    /// Raw fee value as stored on-chain.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Lowest => 100,
            Self::Low => 500,
            Self::Medium => 2500,
            Self::Standard => 3000,
            Self::High => 10_000,
        }
    }

    /// Fee as a percentage, e.g. `0.25` for the 2500 tier.
    #[must_use]
    pub fn percent(self) -> Decimal {
        Decimal::new(i64::from(self.raw()), 4).normalize()
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = LedgerError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            100 => Ok(Self::Lowest),
            500 => Ok(Self::Low),
            2500 => Ok(Self::Medium),
            3000 => Ok(Self::Standard),
            10_000 => Ok(Self::High),
            other => Err(LedgerError::Decode(format!("unsupported fee tier {other}"))),
        }
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> Self {
        tier.raw()
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Position lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    /// Liquidity is still deployed.
    Active,
    /// Liquidity fully withdrawn; the NFT remains.
    Closed,
}

impl PositionStatus {
    /// Active iff liquidity is non-zero.
    #[must_use]
    pub const fn from_liquidity(liquidity: u128) -> Self {
        if liquidity > 0 {
            Self::Active
        } else {
            Self::Closed
        }
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// Decoded on-chain position state, before enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPosition {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

/// Resolved symbols for a position's two tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSymbols {
    pub token0: String,
    pub token1: String,
}

/// An enriched liquidity position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub id: PositionId,
    pub network: Network,
    pub token0_address: Address,
    pub token1_address: Address,
    pub token0_symbol: String,
    pub token1_symbol: String,
    pub fee_tier: FeeTier,
    pub fee_percent: Decimal,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub price_lower: f64,
    pub price_upper: f64,
    #[serde(serialize_with = "as_decimal_string")]
    pub liquidity: u128,
    #[serde(serialize_with = "as_decimal_string")]
    pub tokens_owed0: u128,
    #[serde(serialize_with = "as_decimal_string")]
    pub tokens_owed1: u128,
    pub status: PositionStatus,
}

impl Position {
    /// Build an enriched position from raw ledger state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Decode`] for an unsupported fee tier or an
    /// invalid tick range.
    pub fn from_raw(
        id: PositionId,
        network: Network,
        raw: RawPosition,
        symbols: TokenSymbols,
    ) -> Result<Self, LedgerError> {
        let fee_tier = FeeTier::try_from(raw.fee)?;
        validate_range(raw.tick_lower, raw.tick_upper)?;

        Ok(Self {
            id,
            network,
            token0_address: raw.token0,
            token1_address: raw.token1,
            token0_symbol: symbols.token0,
            token1_symbol: symbols.token1,
            fee_tier,
            fee_percent: fee_tier.percent(),
            tick_lower: raw.tick_lower,
            tick_upper: raw.tick_upper,
            price_lower: price_at_tick(raw.tick_lower),
            price_upper: price_at_tick(raw.tick_upper),
            liquidity: raw.liquidity,
            tokens_owed0: raw.tokens_owed0,
            tokens_owed1: raw.tokens_owed1,
            status: PositionStatus::from_liquidity(raw.liquidity),
        })
    }

    /// Trading pair label, e.g. `WBNB/USDT`.
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{}/{}", self.token0_symbol, self.token1_symbol)
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, PositionStatus::Active)
    }
}

fn as_decimal_string<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use rust_decimal_macros::dec;

    use super::*;

    fn raw(fee: u32, liquidity: u128) -> RawPosition {
        RawPosition {
            token0: address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"),
            token1: address!("55d398326f99059fF775485246999027B3197955"),
            fee,
            tick_lower: -600,
            tick_upper: 600,
            liquidity,
            tokens_owed0: 7,
            tokens_owed1: 0,
        }
    }

    fn symbols() -> TokenSymbols {
        TokenSymbols {
            token0: "WBNB".into(),
            token1: "USDT".into(),
        }
    }

    #[test]
    fn fee_tier_percent_matches_raw_value() {
        assert_eq!(FeeTier::Lowest.percent(), dec!(0.01));
        assert_eq!(FeeTier::Medium.percent(), dec!(0.25));
        assert_eq!(FeeTier::Standard.percent(), dec!(0.3));
        assert_eq!(FeeTier::High.percent(), dec!(1));
        assert_eq!(FeeTier::Medium.to_string(), "0.25%");
    }

    #[test]
    fn fee_tier_rejects_unknown_value() {
        assert!(matches!(FeeTier::try_from(42), Err(LedgerError::Decode(_))));
    }

    #[test]
    fn from_raw_derives_prices_and_status() {
        let position =
            Position::from_raw(PositionId::from(1u64), Network::Bsc, raw(2500, 10), symbols())
                .unwrap();

        assert_eq!(position.status, PositionStatus::Active);
        assert_eq!(position.fee_tier, FeeTier::Medium);
        assert!(position.price_lower < 1.0 && position.price_upper > 1.0);
        assert!((position.price_lower * position.price_upper - 1.0).abs() < 1e-9);
        assert_eq!(position.pair(), "WBNB/USDT");
    }

    #[test]
    fn from_raw_marks_zero_liquidity_closed() {
        let position =
            Position::from_raw(PositionId::from(1u64), Network::Bsc, raw(500, 0), symbols())
                .unwrap();
        assert_eq!(position.status, PositionStatus::Closed);
        assert!(!position.is_active());
    }

    #[test]
    fn from_raw_rejects_unsupported_fee() {
        let result =
            Position::from_raw(PositionId::from(1u64), Network::Bsc, raw(123, 1), symbols());
        assert!(result.is_err());
    }

    #[test]
    fn amounts_serialize_as_strings() {
        let mut state = raw(3000, u128::MAX);
        state.tokens_owed1 = 1;
        let position =
            Position::from_raw(PositionId::from(5u64), Network::Ethereum, state, symbols())
                .unwrap();
        let json = serde_json::to_value(&position).unwrap();

        assert_eq!(json["liquidity"], u128::MAX.to_string());
        assert_eq!(json["tokens_owed0"], "7");
        assert_eq!(json["tokens_owed1"], "1");
        assert_eq!(json["status"], "active");
        assert_eq!(json["fee_tier"], 3000);
        assert_eq!(json["network"], "ethereum");
    }
}
