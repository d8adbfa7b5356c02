//! Payment intent state machine.
//!
//! Transitions here are pure: no I/O, no clocks. The orchestrator performs
//! the network step first and only then applies the matching transition, so
//! a failed or cancelled step leaves the intent where it was.

use serde::Serialize;
use uuid::Uuid;

use crate::payments::types::{PaymentError, PaymentParameters, PaymentQuote, PaymentResult, PaymentState};
use crate::relay::{TransactionReceiptRef, TransactionSkeleton};

/// One user-initiated payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    id: Uuid,
    parameters: PaymentParameters,
    state: PaymentState,
    skeleton: Option<TransactionSkeleton>,
    quote: Option<PaymentQuote>,
    signature: Option<String>,
    receipt: Option<TransactionReceiptRef>,
    failure: Option<String>,
    outcome_unknown: bool,
}

impl PaymentIntent {
    pub fn new(parameters: PaymentParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            parameters,
            state: PaymentState::Empty,
            skeleton: None,
            quote: None,
            signature: None,
            receipt: None,
            failure: None,
            outcome_unknown: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parameters(&self) -> &PaymentParameters {
        &self.parameters
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn skeleton(&self) -> Option<&TransactionSkeleton> {
        self.skeleton.as_ref()
    }

    pub fn quote(&self) -> Option<&PaymentQuote> {
        self.quote.as_ref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn receipt(&self) -> Option<&TransactionReceiptRef> {
        self.receipt.as_ref()
    }

    /// Reason recorded when the relay rejected the transaction.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// A broadcast was attempted and its outcome is not known.
    pub fn outcome_unknown(&self) -> bool {
        self.outcome_unknown
    }

    fn require(&self, action: &'static str, allowed: &[PaymentState]) -> PaymentResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(PaymentError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    pub(crate) fn check_fetch_skeleton(&self) -> PaymentResult<()> {
        self.require("fetch skeleton", &[PaymentState::Empty])
    }

    pub(crate) fn check_quote(&self) -> PaymentResult<&TransactionSkeleton> {
        self.require("compute quote", &[PaymentState::SkeletonReady, PaymentState::Quoted])?;
        self.skeleton.as_ref().ok_or(PaymentError::InvalidTransition {
            action: "compute quote",
            state: self.state,
        })
    }

    /// Returns the skeleton to sign once the quote allows it.
    pub(crate) fn check_sign(&self) -> PaymentResult<&TransactionSkeleton> {
        self.require("sign", &[PaymentState::Quoted])?;
        let (skeleton, quote) = match (self.skeleton.as_ref(), self.quote.as_ref()) {
            (Some(skeleton), Some(quote)) => (skeleton, quote),
            _ => {
                return Err(PaymentError::InvalidTransition {
                    action: "sign",
                    state: self.state,
                })
            }
        };
        if !quote.sufficient_balance {
            return Err(PaymentError::InsufficientBalance {
                balance: quote.balance.confirmed,
                total: quote.total,
            });
        }
        Ok(skeleton)
    }

    /// Returns `(unsigned_hex, signature_hex)` to broadcast.
    pub(crate) fn check_submit(&self) -> PaymentResult<(String, String)> {
        self.require("submit", &[PaymentState::Signed])?;
        if self.outcome_unknown {
            return Err(PaymentError::OutcomeUnknown);
        }
        match (self.skeleton.as_ref(), self.signature.as_ref()) {
            (Some(skeleton), Some(signature)) => {
                Ok((skeleton.unsigned_transaction_hex.clone(), signature.clone()))
            }
            _ => Err(PaymentError::InvalidTransition {
                action: "submit",
                state: self.state,
            }),
        }
    }

    pub(crate) fn skeleton_ready(&mut self, skeleton: TransactionSkeleton) {
        self.skeleton = Some(skeleton);
        self.state = PaymentState::SkeletonReady;
    }

    pub(crate) fn quoted(&mut self, quote: PaymentQuote) {
        self.quote = Some(quote);
        self.state = PaymentState::Quoted;
    }

    pub(crate) fn signed(&mut self, signature: String) {
        self.signature = Some(signature);
        self.state = PaymentState::Signed;
    }

    /// Set before the broadcast is awaited; cleared only by a definite outcome
    /// or an explicit resubmission confirmation.
    pub(crate) fn mark_broadcast_attempt(&mut self) {
        self.outcome_unknown = true;
    }

    pub(crate) fn submitted(&mut self, receipt: TransactionReceiptRef) {
        self.receipt = Some(receipt);
        self.outcome_unknown = false;
        self.state = PaymentState::Submitted;
    }

    pub(crate) fn failed(&mut self, reason: String) {
        self.failure = Some(reason);
        self.outcome_unknown = false;
        self.state = PaymentState::Failed;
    }

    /// A definite non-broadcast failure (e.g. connection refused).
    pub(crate) fn broadcast_not_sent(&mut self) {
        self.outcome_unknown = false;
    }

    pub(crate) fn confirm_resubmission(&mut self) -> PaymentResult<()> {
        self.require("confirm resubmission", &[PaymentState::Signed])?;
        self.outcome_unknown = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{Amount, ExchangeRate};
    use crate::relay::Balance;
    use alloy::primitives::Address;

    fn skeleton() -> TransactionSkeleton {
        TransactionSkeleton {
            from: Address::repeat_byte(0x11),
            to: Address::repeat_byte(0x22),
            value: Amount::from(1000u64),
            gas: Amount::from(21000u64),
            gas_price: Amount::from(1u64),
            nonce: None,
            data: None,
            unsigned_transaction_hex: "0xdeadbeef".to_string(),
        }
    }

    fn quote(sufficient: bool) -> PaymentQuote {
        PaymentQuote {
            fee: Amount::from(21000u64),
            total: Amount::from(22000u64),
            balance: Balance {
                confirmed: Amount::from(if sufficient { 22000u64 } else { 21999u64 }),
                unconfirmed: None,
            },
            sufficient_balance: sufficient,
            rate: ExchangeRate::new("USD", Default::default()),
            fiat_value: Some("0.00 USD".into()),
            fiat_fee: Some("0.00 USD".into()),
            fiat_total: Some("0.00 USD".into()),
            ether_total: "0.000000000000022 ETH".into(),
            fiat_balance: Some("0.00 USD".into()),
        }
    }

    fn intent() -> PaymentIntent {
        PaymentIntent::new(PaymentParameters::new(Address::repeat_byte(0x22), Amount::from(1000u64)))
    }

    #[test]
    fn test_sign_before_skeleton_is_rejected() {
        let intent = intent();
        let err = intent.check_sign().unwrap_err();
        assert!(matches!(
            err,
            PaymentError::InvalidTransition {
                action: "sign",
                state: PaymentState::Empty
            }
        ));
        assert_eq!(intent.state(), PaymentState::Empty);
    }

    #[test]
    fn test_full_happy_path() {
        let mut intent = intent();
        intent.check_fetch_skeleton().unwrap();
        intent.skeleton_ready(skeleton());
        intent.check_quote().unwrap();
        intent.quoted(quote(true));
        intent.check_sign().unwrap();
        intent.signed("0xsig".into());

        let (tx, sig) = intent.check_submit().unwrap();
        assert_eq!(tx, "0xdeadbeef");
        assert_eq!(sig, "0xsig");

        intent.mark_broadcast_attempt();
        intent.submitted(TransactionReceiptRef::from_json(serde_json::json!({"tx_hash": "0xabc"})));
        assert_eq!(intent.state(), PaymentState::Submitted);
        assert!(!intent.outcome_unknown());
        assert!(intent.check_submit().is_err());
        assert!(intent.check_quote().is_err());
    }

    #[test]
    fn test_requote_is_allowed() {
        let mut intent = intent();
        intent.skeleton_ready(skeleton());
        intent.quoted(quote(false));
        assert!(intent.check_quote().is_ok());
    }

    #[test]
    fn test_insufficient_balance_blocks_signing() {
        let mut intent = intent();
        intent.skeleton_ready(skeleton());
        intent.quoted(quote(false));
        assert!(matches!(
            intent.check_sign(),
            Err(PaymentError::InsufficientBalance { .. })
        ));
        assert_eq!(intent.state(), PaymentState::Quoted);
    }

    #[test]
    fn test_unknown_outcome_requires_confirmation() {
        let mut intent = intent();
        intent.skeleton_ready(skeleton());
        intent.quoted(quote(true));
        intent.signed("0xsig".into());
        intent.mark_broadcast_attempt();

        assert!(matches!(intent.check_submit(), Err(PaymentError::OutcomeUnknown)));
        intent.confirm_resubmission().unwrap();
        assert!(intent.check_submit().is_ok());
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut intent = intent();
        intent.skeleton_ready(skeleton());
        intent.quoted(quote(true));
        intent.signed("0xsig".into());
        intent.failed("insufficient_funds".into());

        assert_eq!(intent.failure(), Some("insufficient_funds"));
        assert!(intent.check_submit().is_err());
        assert!(intent.confirm_resubmission().is_err());
        assert!(intent.check_fetch_skeleton().is_err());
    }

    #[test]
    fn test_intents_have_distinct_ids() {
        assert_ne!(intent().id(), intent().id());
    }
}
