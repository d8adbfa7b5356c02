//! Payment flow types and errors.

use alloy::primitives::Address;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::blockchain::parse_address;
use crate::numeric::{hex_to_decimal, Amount, ExchangeRate, NumericError};
use crate::relay::{Balance, RelayError};

/// What the user asked to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentParameters {
    /// Sender; defaults to the signing key's address when unset.
    pub from: Option<Address>,
    pub to: Address,
    pub value: Amount,
    pub data: Option<String>,
    pub gas: Option<Amount>,
    pub gas_price: Option<Amount>,
    pub nonce: Option<Amount>,
}

impl PaymentParameters {
    /// A plain transfer of `value` wei to `to`.
    pub fn new(to: Address, value: Amount) -> Self {
        Self {
            from: None,
            to,
            value,
            data: None,
            gas: None,
            gas_price: None,
            nonce: None,
        }
    }

    /// Build from untrusted strings: recipient address and hex value.
    pub fn parse(to: &str, value_hex: &str) -> PaymentResult<Self> {
        let to = parse_address(to).map_err(|e| PaymentError::InvalidParameters(e.to_string()))?;
        let value = hex_to_decimal(value_hex)?;
        Ok(Self::new(to, value))
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_gas(mut self, gas: Amount) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_gas_price(mut self, gas_price: Amount) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_nonce(mut self, nonce: Amount) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// Fee, total and sufficiency figures for one skeleton, all from one rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentQuote {
    pub fee: Amount,
    pub total: Amount,
    pub balance: Balance,
    pub sufficient_balance: bool,
    /// The exchange-rate snapshot every fiat figure below was computed from.
    pub rate: ExchangeRate,
    /// `None` when the amount is beyond what a fiat decimal can hold.
    pub fiat_value: Option<String>,
    pub fiat_fee: Option<String>,
    pub fiat_total: Option<String>,
    pub ether_total: String,
    pub fiat_balance: Option<String>,
}

/// Lifecycle of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Empty,
    SkeletonReady,
    Quoted,
    Signed,
    Submitted,
    Failed,
}

impl PaymentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentState::Submitted | PaymentState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Empty => "empty",
            PaymentState::SkeletonReady => "skeleton_ready",
            PaymentState::Quoted => "quoted",
            PaymentState::Signed => "signed",
            PaymentState::Submitted => "submitted",
            PaymentState::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which step of the flow an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStage {
    Skeleton,
    Quote,
    Sign,
    Submit,
}

impl fmt::Display for PaymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStage::Skeleton => "skeleton",
            PaymentStage::Quote => "quote",
            PaymentStage::Sign => "sign",
            PaymentStage::Submit => "submit",
        })
    }
}

/// Errors surfaced by the payment orchestrator.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The requested step is not valid from the current state.
    #[error("Cannot {action} while payment is {state}")]
    InvalidTransition { action: &'static str, state: PaymentState },

    /// A relay or signing call failed during `stage`.
    #[error("Payment {stage} failed: {source}")]
    Stage {
        stage: PaymentStage,
        #[source]
        source: RelayError,
    },

    /// Balance does not cover value plus fee.
    #[error("Insufficient balance: have {balance} wei, need {total} wei")]
    InsufficientBalance { balance: Amount, total: Amount },

    /// A previous broadcast may have gone through.
    #[error("Previous broadcast outcome is unknown; check transaction status before resubmitting")]
    OutcomeUnknown,

    #[error("Invalid payment parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Numeric(#[from] NumericError),
}

impl PaymentError {
    pub(crate) fn stage(stage: PaymentStage) -> impl FnOnce(RelayError) -> PaymentError {
        move |source| PaymentError::Stage { stage, source }
    }

    /// The broadcast may or may not have happened; offer "check status",
    /// not "retry".
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            PaymentError::OutcomeUnknown
                | PaymentError::Stage {
                    source: RelayError::AmbiguousSubmission(_),
                    ..
                }
        )
    }

    /// The relay refused the transaction.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PaymentError::Stage {
                stage: PaymentStage::Submit,
                source: RelayError::Rejected(_) | RelayError::Protocol { .. },
            }
        )
    }
}

/// Result type for payment operations.
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parameters() {
        let params =
            PaymentParameters::parse("0x3535353535353535353535353535353535353535", "0xde0b6b3a7640000").unwrap();
        assert_eq!(params.value, Amount::from(1_000_000_000_000_000_000u64));
        assert_eq!(params.from, None);

        assert!(matches!(
            PaymentParameters::parse("0x35", "0x1"),
            Err(PaymentError::InvalidParameters(_))
        ));
        assert!(matches!(
            PaymentParameters::parse("0x3535353535353535353535353535353535353535", "0xnope"),
            Err(PaymentError::Numeric(_))
        ));
    }

    #[test]
    fn test_terminal_states() {
        assert!(PaymentState::Submitted.is_terminal());
        assert!(PaymentState::Failed.is_terminal());
        assert!(!PaymentState::Signed.is_terminal());
    }

    #[test]
    fn test_error_classification() {
        let ambiguous = PaymentError::Stage {
            stage: PaymentStage::Submit,
            source: RelayError::AmbiguousSubmission("timeout".into()),
        };
        assert!(ambiguous.is_ambiguous());
        assert!(!ambiguous.is_rejection());
        assert!(PaymentError::OutcomeUnknown.is_ambiguous());

        let transition = PaymentError::InvalidTransition {
            action: "sign",
            state: PaymentState::Empty,
        };
        assert_eq!(transition.to_string(), "Cannot sign while payment is empty");
    }
}
