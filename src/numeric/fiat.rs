//! Fiat and ether display figures.
//!
//! Exchange-rate lookup lives outside this crate; it is consumed through
//! [`ExchangeRateSource`] as a plain function returning a rate.

use alloy::primitives::utils::format_ether;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::numeric::{Amount, NumericError, NumericResult};

/// Wei per ether, as a decimal scale.
const ETHER_DECIMALS: u32 = 18;

/// Price of one ether in a display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// ISO currency code, e.g. "USD".
    pub currency: String,
    /// Units of `currency` per ether.
    pub per_ether: Decimal,
}

impl ExchangeRate {
    pub fn new(currency: impl Into<String>, per_ether: Decimal) -> Self {
        Self {
            currency: currency.into(),
            per_ether,
        }
    }

    /// Parse a rate from its decimal string form (as found in config files).
    pub fn parse(currency: impl Into<String>, per_ether: &str) -> NumericResult<Self> {
        let rate = Decimal::from_str(per_ether).map_err(|e| {
            NumericError::InvalidNumericFormat(format!("exchange rate '{}': {}", per_ether, e))
        })?;
        if rate.is_sign_negative() {
            return Err(NumericError::InvalidNumericFormat(format!(
                "exchange rate '{}' is negative",
                per_ether
            )));
        }
        Ok(Self::new(currency, rate))
    }

    /// Exact fiat value of `wei`, rounded to cents.
    pub fn fiat_value(&self, wei: Amount) -> NumericResult<Decimal> {
        let ether = wei_to_ether(wei)?;
        ether
            .checked_mul(self.per_ether)
            .map(|v| v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            .ok_or_else(|| NumericError::Overflow(format!("fiat value of {} wei", wei)))
    }

    /// Fiat value formatted with the currency code, e.g. `"12.34 USD"`.
    pub fn fiat_string_with_code(&self, wei: Amount) -> NumericResult<String> {
        let value = self.fiat_value(wei)?;
        Ok(format!("{:.2} {}", value, self.currency))
    }
}

/// Supplies the current exchange rate.
pub trait ExchangeRateSource: Send + Sync {
    fn exchange_rate(&self) -> ExchangeRate;
}

/// A rate that never changes; used by the CLI and in tests.
#[derive(Debug, Clone)]
pub struct FixedExchangeRate(pub ExchangeRate);

impl ExchangeRateSource for FixedExchangeRate {
    fn exchange_rate(&self) -> ExchangeRate {
        self.0.clone()
    }
}

/// Ether value of `wei` as an exact decimal.
fn wei_to_ether(wei: Amount) -> NumericResult<Decimal> {
    let overflow = || NumericError::Overflow(format!("{} wei does not fit a fiat decimal", wei));
    let raw: u128 = wei.as_u256().try_into().map_err(|_| overflow())?;
    let raw = i128::try_from(raw).map_err(|_| overflow())?;
    Decimal::try_from_i128_with_scale(raw, ETHER_DECIMALS).map_err(|_| overflow())
}

/// Ether amount with trailing zeros trimmed, e.g. `"0.00042 ETH"`.
pub fn ether_string(wei: Amount) -> String {
    let formatted = format_ether(wei.as_u256());
    let trimmed = match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => formatted,
    };
    format!("{} ETH", trimmed)
}
