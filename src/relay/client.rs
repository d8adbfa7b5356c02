//! Relay service client.
//!
//! # Responsibilities
//! - Build unsigned transaction skeletons
//! - Broadcast signed transactions (signed request, never retried)
//! - Fetch balances
//! - Register addresses and push tokens for notifications (signed requests)

use alloy::primitives::Address;
use reqwest::Method;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::RequestSigner;
use crate::blockchain::{address_hex, KeySigner};
use crate::config::RelayConfig;
use crate::observability::metrics;
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::transport::{HttpTransport, RawResponse};
use crate::relay::types::{
    AddressesRequest, Balance, BalanceResponse, BroadcastRequest, ErrorBody, PushRegistrationRequest,
    SkeletonParams, SkeletonRequest, SkeletonResponse, TransactionReceiptRef, TransactionSkeleton,
    BALANCE_PATH, BROADCAST_PATH, DEREGISTER_PATH, PUSH_REGISTER_PATH, REGISTER_PATH, SKELETON_PATH,
};

/// Context object for talking to one relay with one (optional) key.
///
/// Built once at startup and cloned by handle; clones share the HTTP pool.
#[derive(Clone, Debug)]
pub struct RelayClient {
    transport: HttpTransport,
    signer: RequestSigner,
}

impl RelayClient {
    /// Create a client. `key` may be `None` for read-only use; signed calls
    /// then fail with `SigningUnavailable`.
    pub fn new(config: &RelayConfig, key: Option<Arc<dyn KeySigner>>) -> RelayResult<Self> {
        let transport = HttpTransport::new(&config.api, &config.retries)?;
        let signer = RequestSigner::new(transport.clone(), key);

        tracing::info!(
            base_url = %transport.base_url(),
            signer = ?signer.address().ok(),
            "Relay client initialized"
        );

        Ok(Self { transport, signer })
    }

    /// Address of the configured key.
    pub fn address(&self) -> RelayResult<Address> {
        self.signer.address()
    }

    /// The configured key.
    pub fn key(&self) -> RelayResult<Arc<dyn KeySigner>> {
        self.signer.key().cloned()
    }

    /// Server time, as used in `Token-Timestamp`.
    pub async fn current_server_timestamp(&self) -> RelayResult<String> {
        self.signer.current_server_timestamp().await
    }

    /// Ask the relay to build an unsigned transaction.
    ///
    /// Unauthenticated. The returned skeleton is fully populated or the call
    /// fails; there is no partial result.
    pub async fn create_unsigned_transaction(
        &self,
        params: &SkeletonParams,
    ) -> RelayResult<TransactionSkeleton> {
        let body = to_body(&SkeletonRequest::from(params))?;
        let response = self.transport.post(SKELETON_PATH, body, &[]).await?;

        if !response.is_success() {
            let server_message = ErrorBody::server_message(&response.body);
            tracing::warn!(
                status = response.status.as_u16(),
                server_message = %server_message,
                "Skeleton build rejected"
            );
            return Err(RelayError::SkeletonBuild {
                status: response.status.as_u16(),
                server_message,
            });
        }

        let raw: SkeletonResponse = response.json(SKELETON_PATH)?;
        let skeleton = TransactionSkeleton::from_response(params, raw)?;

        tracing::info!(
            to = %skeleton.to,
            value = %skeleton.value,
            gas = %skeleton.gas,
            gas_price = %skeleton.gas_price,
            "Transaction skeleton built"
        );
        Ok(skeleton)
    }

    /// Broadcast a signed transaction.
    ///
    /// Never retried. A timeout, or a transport failure after the connection
    /// was made, is reported as [`RelayError::AmbiguousSubmission`]: the relay
    /// may already hold the transaction. So is a 5xx without an `errors`
    /// list. A rejection carries only the first error object the relay
    /// reported.
    pub async fn send_signed_transaction(
        &self,
        unsigned_hex: &str,
        signature_hex: &str,
    ) -> RelayResult<TransactionReceiptRef> {
        let body = to_body(&BroadcastRequest {
            tx: unsigned_hex,
            signature: signature_hex,
        })?;

        // Time sync and signing failures happen before anything is sent.
        let envelope = self.signer.sign_request(&Method::POST, BROADCAST_PATH, &body).await?;

        let response = match self.transport.post(BROADCAST_PATH, body, &envelope.headers()).await {
            Ok(response) => response,
            Err(RelayError::Timeout(msg)) => {
                metrics::record_broadcast("ambiguous");
                return Err(RelayError::AmbiguousSubmission(format!("timed out: {}", msg)));
            }
            Err(RelayError::Network { message, connect: false }) => {
                metrics::record_broadcast("ambiguous");
                return Err(RelayError::AmbiguousSubmission(message));
            }
            Err(e) => return Err(e),
        };

        if response.is_success() {
            // Accepted is accepted: an odd body must not turn into a retryable error.
            let raw = if response.body.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_slice(&response.body).unwrap_or_else(|_| {
                    serde_json::Value::String(String::from_utf8_lossy(&response.body).into_owned())
                })
            };
            let receipt = TransactionReceiptRef::from_json(raw);
            metrics::record_broadcast("accepted");
            tracing::info!(tx_hash = ?receipt.tx_hash, "Transaction broadcast accepted");
            return Ok(receipt);
        }

        let status = response.status.as_u16();
        match ErrorBody::first_error(&response.body) {
            Some(first) => {
                metrics::record_broadcast("rejected");
                tracing::warn!(status, error = %first, "Transaction broadcast rejected");
                Err(RelayError::Rejected(first))
            }
            // An unstructured 5xx may come from a gateway in front of the
            // relay; the relay itself may still hold the transaction.
            None if response.status.is_server_error() => {
                metrics::record_broadcast("ambiguous");
                let message = ErrorBody::server_message(&response.body);
                tracing::warn!(status, server_message = %message, "Broadcast answered without a verdict");
                Err(RelayError::AmbiguousSubmission(format!("relay returned {}: {}", status, message)))
            }
            None => {
                metrics::record_broadcast("protocol_error");
                Err(RelayError::Protocol {
                    status,
                    message: ErrorBody::server_message(&response.body),
                })
            }
        }
    }

    /// Fetch the current balance of `address`. A missing confirmed balance is zero.
    pub async fn get_balance(&self, address: &Address) -> RelayResult<Balance> {
        let path = format!("{}/{}", BALANCE_PATH, address_hex(address));
        let response = self.transport.get(&path).await?.ensure_success()?;
        let raw: BalanceResponse = response.json(&path)?;
        Balance::from_response(raw)
    }

    /// Register a push token for this key's address.
    pub async fn register_for_push_notifications(&self, registration_id: &str) -> RelayResult<()> {
        let body = to_body(&PushRegistrationRequest { registration_id })?;
        self.post_signed(PUSH_REGISTER_PATH, body).await?.ensure_success()?;
        tracing::info!("Registered for push notifications");
        Ok(())
    }

    /// Subscribe `addresses` to transaction notifications.
    pub async fn register_for_notifications(&self, addresses: &[Address]) -> RelayResult<()> {
        self.post_addresses(REGISTER_PATH, addresses).await?;
        tracing::info!(count = addresses.len(), "Registered addresses for notifications");
        Ok(())
    }

    /// Unsubscribe `addresses` from transaction notifications.
    pub async fn deregister_for_notifications(&self, addresses: &[Address]) -> RelayResult<()> {
        self.post_addresses(DEREGISTER_PATH, addresses).await?;
        tracing::info!(count = addresses.len(), "Deregistered addresses from notifications");
        Ok(())
    }

    async fn post_addresses(&self, path: &str, addresses: &[Address]) -> RelayResult<()> {
        let body = to_body(&AddressesRequest {
            addresses: addresses.iter().map(address_hex).collect(),
        })?;
        self.post_signed(path, body).await?.ensure_success()?;
        Ok(())
    }

    /// Sign `body` and POST those same bytes.
    async fn post_signed(&self, path: &str, body: Vec<u8>) -> RelayResult<RawResponse> {
        let envelope = self.signer.sign_request(&Method::POST, path, &body).await?;
        tracing::debug!(
            path,
            timestamp = %envelope.timestamp,
            body_hash = %envelope.body_hash,
            "Signed request"
        );
        self.transport.post(path, body, &envelope.headers()).await
    }
}

/// Serialize once; these bytes are both hashed and sent.
fn to_body<T: Serialize>(value: &T) -> RelayResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| RelayError::Config(format!("request body: {}", e)))
}
