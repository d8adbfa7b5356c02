//! Wei amounts and the hex/decimal codec.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::numeric::{NumericError, NumericResult};

/// Largest hex body (without leading zeros) that fits in 256 bits.
const MAX_HEX_DIGITS: usize = 64;

/// An exact non-negative quantity of wei.
///
/// Displays and parses as a base-10 integer. Serializes as `0x` hex, which is
/// what the relay service speaks on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Amount = Amount(U256::ZERO);

    /// Wrap a raw 256-bit value.
    pub const fn from_u256(value: U256) -> Self {
        Self(value)
    }

    /// The raw 256-bit value.
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Amount) -> NumericResult<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| NumericError::Overflow(format!("{} + {}", self, other)))
    }

    pub fn checked_mul(self, other: Amount) -> NumericResult<Amount> {
        self.0
            .checked_mul(other.0)
            .map(Amount)
            .ok_or_else(|| NumericError::Overflow(format!("{} * {}", self, other)))
    }

    /// `self >= other`; equal counts as sufficient.
    pub fn is_greater_or_equal(&self, other: &Amount) -> bool {
        self.0 >= other.0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = NumericError;

    /// Parse a base-10 integer string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NumericError::InvalidNumericFormat(format!(
                "'{}' is not a decimal integer",
                s
            )));
        }
        U256::from_str_radix(s, 10)
            .map(Amount)
            .map_err(|_| NumericError::Overflow(format!("'{}' exceeds 256 bits", s)))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&decimal_to_hex(*self))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex_to_decimal(s.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Decode a hex integer into an exact amount.
///
/// Accepts `0x`/`0X`-prefixed or bare hex with any number of leading zeros.
/// Empty or absent input decodes to zero.
pub fn hex_to_decimal<'a>(input: impl Into<Option<&'a str>>) -> NumericResult<Amount> {
    let Some(raw) = input.into() else {
        return Ok(Amount::ZERO);
    };
    let body = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NumericError::InvalidNumericFormat(format!(
            "'{}' is not a hex integer",
            raw
        )));
    }

    let significant = body.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(Amount::ZERO);
    }
    if significant.len() > MAX_HEX_DIGITS {
        return Err(NumericError::Overflow(format!("'{}' exceeds 256 bits", raw)));
    }

    U256::from_str_radix(significant, 16)
        .map(Amount)
        .map_err(|e| NumericError::InvalidNumericFormat(format!("'{}': {}", raw, e)))
}

/// Encode an amount as minimal lower-case `0x` hex. Zero is `0x0`.
pub fn decimal_to_hex(amount: Amount) -> String {
    if amount.is_zero() {
        return "0x0".to_string();
    }
    format!("0x{:x}", amount.0)
}
