//! Drives one payment intent through skeleton, quote, sign and submit.
//!
//! # Design Decisions
//! - Every step takes `&mut self`; one step at a time per intent
//! - The intent is mutated only after the awaited call resolves, so dropping
//!   a step's future leaves the previous state intact
//! - `submit` is the exception: the outcome-unknown flag is raised before the
//!   broadcast is awaited, so a cancelled broadcast cannot be resent silently

use std::sync::Arc;
use tracing::Instrument;

use crate::blockchain::signature_hex;
use crate::numeric::{ether_string, Amount, ExchangeRate, ExchangeRateSource, NumericError};
use crate::observability::metrics;
use crate::payments::intent::PaymentIntent;
use crate::payments::types::{
    PaymentError, PaymentParameters, PaymentQuote, PaymentResult, PaymentStage, PaymentState,
};
use crate::relay::{RelayClient, RelayError, SkeletonParams, TransactionReceiptRef, TransactionSkeleton};

pub struct PaymentOrchestrator {
    client: RelayClient,
    rates: Arc<dyn ExchangeRateSource>,
    intent: PaymentIntent,
}

impl PaymentOrchestrator {
    pub fn new(
        client: RelayClient,
        rates: Arc<dyn ExchangeRateSource>,
        parameters: PaymentParameters,
    ) -> Self {
        let intent = PaymentIntent::new(parameters);
        tracing::info!(
            intent_id = %intent.id(),
            to = %intent.parameters().to,
            value = %intent.parameters().value,
            "Payment intent created"
        );
        Self {
            client,
            rates,
            intent,
        }
    }

    pub fn intent(&self) -> &PaymentIntent {
        &self.intent
    }

    pub fn state(&self) -> PaymentState {
        self.intent.state()
    }

    fn span(&self, step: &'static str) -> tracing::Span {
        tracing::info_span!("payment", intent_id = %self.intent.id(), step)
    }

    fn transition(&self, state: PaymentState) {
        metrics::record_payment_transition(state.as_str());
        tracing::info!(intent_id = %self.intent.id(), state = %state, "Payment state changed");
    }

    /// `Empty -> SkeletonReady`.
    pub async fn fetch_skeleton(&mut self) -> PaymentResult<&TransactionSkeleton> {
        self.intent.check_fetch_skeleton()?;

        let parameters = self.intent.parameters();
        let from = match parameters.from {
            Some(from) => from,
            None => self.client.address().map_err(PaymentError::stage(PaymentStage::Skeleton))?,
        };
        let params = SkeletonParams {
            from,
            to: parameters.to,
            value: parameters.value,
            data: parameters.data.clone(),
            gas: parameters.gas,
            gas_price: parameters.gas_price,
            nonce: parameters.nonce,
        };

        let skeleton = self
            .client
            .create_unsigned_transaction(&params)
            .instrument(self.span("skeleton"))
            .await
            .map_err(PaymentError::stage(PaymentStage::Skeleton))?;

        self.intent.skeleton_ready(skeleton);
        self.transition(PaymentState::SkeletonReady);
        self.intent
            .skeleton()
            .ok_or(PaymentError::InvalidTransition {
                action: "fetch skeleton",
                state: self.intent.state(),
            })
    }

    /// `SkeletonReady | Quoted -> Quoted`.
    ///
    /// Re-quoting fetches a fresh balance and takes a fresh rate snapshot.
    pub async fn compute_quote(&mut self) -> PaymentResult<&PaymentQuote> {
        let skeleton = self.intent.check_quote()?;
        let quote_error = |e: NumericError| PaymentError::Stage {
            stage: PaymentStage::Quote,
            source: RelayError::Numeric(e),
        };
        let fee = skeleton.gas_price.checked_mul(skeleton.gas).map_err(quote_error)?;
        let total = skeleton.value.checked_add(fee).map_err(quote_error)?;
        let value = skeleton.value;
        let from = skeleton.from;

        // One snapshot for every fiat figure in this quote.
        let rate = self.rates.exchange_rate();

        let balance = self
            .client
            .get_balance(&from)
            .instrument(self.span("quote"))
            .await
            .map_err(PaymentError::stage(PaymentStage::Quote))?;

        let sufficient_balance = balance.confirmed.is_greater_or_equal(&total);
        let quote = PaymentQuote {
            fee,
            total,
            balance,
            sufficient_balance,
            fiat_value: fiat_display(&rate, value),
            fiat_fee: fiat_display(&rate, fee),
            fiat_total: fiat_display(&rate, total),
            ether_total: ether_string(total),
            fiat_balance: fiat_display(&rate, balance.confirmed),
            rate,
        };

        if !sufficient_balance {
            tracing::warn!(
                intent_id = %self.intent.id(),
                balance = %balance.confirmed,
                total = %total,
                "Balance does not cover value plus fee"
            );
        }

        self.intent.quoted(quote);
        self.transition(PaymentState::Quoted);
        self.intent.quote().ok_or(PaymentError::InvalidTransition {
            action: "compute quote",
            state: self.intent.state(),
        })
    }

    /// `Quoted -> Signed`. Local only.
    pub fn sign(&mut self) -> PaymentResult<&str> {
        let skeleton = self.intent.check_sign()?;
        let key = self.client.key().map_err(PaymentError::stage(PaymentStage::Sign))?;
        let signature = key
            .sign_transaction_hex(&skeleton.unsigned_transaction_hex)
            .map_err(|e| PaymentError::Stage {
                stage: PaymentStage::Sign,
                source: RelayError::from(e),
            })?;

        self.intent.signed(signature_hex(&signature));
        self.transition(PaymentState::Signed);
        self.intent.signature().ok_or(PaymentError::InvalidTransition {
            action: "sign",
            state: self.intent.state(),
        })
    }

    /// `Signed -> Submitted | Failed`.
    ///
    /// An ambiguous outcome leaves the intent `Signed` with
    /// [`PaymentIntent::outcome_unknown`] set; further calls return
    /// [`PaymentError::OutcomeUnknown`] until [`Self::confirm_resubmission`].
    pub async fn submit(&mut self) -> PaymentResult<&TransactionReceiptRef> {
        let (unsigned_hex, signature) = self.intent.check_submit()?;

        self.intent.mark_broadcast_attempt();
        let result = self
            .client
            .send_signed_transaction(&unsigned_hex, &signature)
            .instrument(self.span("submit"))
            .await;

        match result {
            Ok(receipt) => {
                self.intent.submitted(receipt);
                self.transition(PaymentState::Submitted);
                self.intent.receipt().ok_or(PaymentError::InvalidTransition {
                    action: "submit",
                    state: self.intent.state(),
                })
            }
            Err(RelayError::AmbiguousSubmission(message)) => {
                tracing::warn!(
                    intent_id = %self.intent.id(),
                    error = %message,
                    "Broadcast outcome unknown"
                );
                Err(PaymentError::Stage {
                    stage: PaymentStage::Submit,
                    source: RelayError::AmbiguousSubmission(message),
                })
            }
            Err(e @ (RelayError::Rejected(_) | RelayError::Protocol { .. })) => {
                self.intent.failed(e.to_string());
                self.transition(PaymentState::Failed);
                Err(PaymentError::Stage {
                    stage: PaymentStage::Submit,
                    source: e,
                })
            }
            Err(e) => {
                // Nothing reached the relay: time sync, key or connect failure.
                self.intent.broadcast_not_sent();
                Err(PaymentError::Stage {
                    stage: PaymentStage::Submit,
                    source: e,
                })
            }
        }
    }

    /// Allow `submit` again after an unknown outcome. Call only once the
    /// caller has checked the transaction did not land.
    pub fn confirm_resubmission(&mut self) -> PaymentResult<()> {
        self.intent.confirm_resubmission()?;
        tracing::info!(intent_id = %self.intent.id(), "Resubmission confirmed");
        Ok(())
    }
}

/// Fiat display for `wei`; amounts a fiat decimal cannot hold have none.
fn fiat_display(rate: &ExchangeRate, wei: Amount) -> Option<String> {
    match rate.fiat_string_with_code(wei) {
        Ok(display) => Some(display),
        Err(e) => {
            tracing::debug!(wei = %wei, error = %e, "No fiat display for amount");
            None
        }
    }
}
