//! Tick math for concentrated-liquidity ranges.

use crate::error::LedgerError;

/// Smallest tick representable by the pool contracts.
pub const MIN_TICK: i32 = -887_272;

/// Largest tick representable by the pool contracts.
pub const MAX_TICK: i32 = 887_272;

const TICK_BASE: f64 = 1.0001;

/// Price of token0 in token1 at the given tick: `1.0001^tick`.
///
/// Raw ratio, not adjusted for token decimals.
#[must_use]
pub fn price_at_tick(tick: i32) -> f64 {
    TICK_BASE.powi(tick)
}

/// Check a lower/upper tick pair against the protocol bounds.
///
/// # Errors
///
/// Returns [`LedgerError::Decode`] when either tick is out of range or the
/// pair is not strictly increasing.
pub fn validate_range(lower: i32, upper: i32) -> Result<(), LedgerError> {
    if !(MIN_TICK..=MAX_TICK).contains(&lower) || !(MIN_TICK..=MAX_TICK).contains(&upper) {
        return Err(LedgerError::Decode(format!(
            "tick range [{lower}, {upper}] outside [{MIN_TICK}, {MAX_TICK}]"
        )));
    }
    if lower >= upper {
        return Err(LedgerError::Decode(format!(
            "tick lower {lower} must be below tick upper {upper}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= b.abs() * 1e-9
    }

    #[test]
    fn price_at_zero_tick_is_one() {
        assert_eq!(price_at_tick(0), 1.0);
    }

    #[test]
    fn price_is_reciprocal_for_opposite_ticks() {
        let up = price_at_tick(6931);
        let down = price_at_tick(-6931);
        assert!(approx(up * down, 1.0));
    }

    #[test]
    fn price_roughly_doubles_every_6932_ticks() {
        assert!((price_at_tick(6932) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn validate_range_accepts_ordered_pair() {
        assert!(validate_range(-100, 100).is_ok());
        assert!(validate_range(MIN_TICK, MAX_TICK).is_ok());
    }

    #[test]
    fn validate_range_rejects_inverted_pair() {
        assert!(validate_range(10, 10).is_err());
        assert!(validate_range(20, 10).is_err());
    }

    #[test]
    fn validate_range_rejects_out_of_bounds() {
        assert!(validate_range(MIN_TICK - 1, 0).is_err());
        assert!(validate_range(0, MAX_TICK + 1).is_err());
    }
}
