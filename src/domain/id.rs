//! Domain identifier types with proper encapsulation.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use serde::{Serialize, Serializer};

use crate::error::LedgerError;

/// Position identifier - the ERC-721 token id minted by the position manager.
///
/// Opaque outside the ledger; only unique within one owner's enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionId(U256);

impl PositionId {
    /// Wrap a raw token id.
    #[must_use]
    pub const fn new(raw: U256) -> Self {
        Self(raw)
    }

    /// Get the raw token id.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PositionId {
    fn from(raw: u64) -> Self {
        Self(U256::from(raw))
    }
}

impl From<U256> for PositionId {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}

// Decimal string so ids above 2^53 survive JSON consumers.
impl Serialize for PositionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Wallet address whose positions are enumerated.
///
/// Parsing normalizes any hex casing into the canonical 20-byte form; display
/// always uses the EIP-55 checksum encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OwnerAddress(Address);

impl OwnerAddress {
    /// Parse and normalize an owner address.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAddress`] when the input is not a
    /// `0x`-prefixed 20-byte hex string.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        parse_address(input).map(Self)
    }

    /// The canonical address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }

    /// EIP-55 checksummed representation.
    #[must_use]
    pub fn checksummed(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl From<Address> for OwnerAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for OwnerAddress {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OwnerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed())
    }
}

/// Parse a `0x`-prefixed hex address, accepting any casing.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAddress`] on a missing prefix, wrong length
/// or non-hex characters.
pub fn parse_address(input: &str) -> Result<Address, LedgerError> {
    let trimmed = input.trim();
    let invalid = |reason: String| LedgerError::InvalidAddress {
        input: input.to_string(),
        reason,
    };

    if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
        return Err(invalid("missing 0x prefix".to_string()));
    }
    Address::from_str(&trimmed[2..]).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOWER: &str = "0x46a15b0b27311cedf172ab29e4f4766fbe7f4364";

    #[test]
    fn owner_address_normalizes_casing() {
        let owner = OwnerAddress::parse(LOWER).unwrap();
        assert_eq!(
            owner.checksummed(),
            "0x46A15B0b27311cedF172AB29E4f4766fbE7F4364"
        );
        assert_eq!(owner.to_string(), owner.checksummed());
    }

    #[test]
    fn owner_address_trims_whitespace() {
        let owner = OwnerAddress::parse(&format!("  {LOWER}\n")).unwrap();
        assert_eq!(owner, OwnerAddress::parse(LOWER).unwrap());
    }

    #[test]
    fn owner_address_rejects_missing_prefix() {
        let err = OwnerAddress::parse(&LOWER[2..]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAddress { .. }));
    }

    #[test]
    fn owner_address_rejects_short_input() {
        assert!(OwnerAddress::parse("0xA").is_err());
        assert!(OwnerAddress::parse("0x").is_err());
    }

    #[test]
    fn owner_address_rejects_non_hex() {
        let input = "0xzz6a15b0b27311cedf172ab29e4f4766fbe7f4364";
        assert!(OwnerAddress::parse(input).is_err());
    }

    #[test]
    fn position_id_serializes_as_decimal_string() {
        let id = PositionId::from(1_234_567u64);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234567\"");
        assert_eq!(id.to_string(), "1234567");
    }

    #[test]
    fn position_id_orders_numerically() {
        assert!(PositionId::from(9u64) < PositionId::from(10u64));
    }
}
