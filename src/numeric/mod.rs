//! Exact monetary arithmetic.
//!
//! # Data Flow
//! ```text
//! wire hex ("0x4a817c800")
//!     → amount.rs (hex_to_decimal)
//!     → Amount (exact 256-bit integer, wei)
//!     → checked arithmetic (fee, total, sufficiency)
//!     → fiat.rs (display strings from one exchange-rate snapshot)
//! ```
//!
//! # Design Decisions
//! - No floating point anywhere on the money path
//! - Overflow is an error, never a wrap
//! - Empty or absent hex is zero (accounts with no history)

pub mod amount;
pub mod fiat;

pub use amount::{decimal_to_hex, hex_to_decimal, Amount};
pub use fiat::{ether_string, ExchangeRate, ExchangeRateSource, FixedExchangeRate};

use thiserror::Error;

/// Errors raised while parsing or combining amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    /// Input is not a valid hex or decimal integer.
    #[error("Invalid numeric format: {0}")]
    InvalidNumericFormat(String),

    /// Result does not fit the supported 256-bit magnitude.
    #[error("Numeric overflow: {0}")]
    Overflow(String),
}

/// Result type for numeric operations.
pub type NumericResult<T> = Result<T, NumericError>;
