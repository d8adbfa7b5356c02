//! Per-request authentication for mutating relay calls.
//!
//! # Responsibilities
//! - Fetch the server's clock (signatures bind a server timestamp)
//! - Sign the canonical message with the external key
//! - Refuse to produce anything when no key is available

use reqwest::Method;
use std::sync::Arc;

use alloy::primitives::Address;

use crate::auth::envelope::{content_hash, message_to_sign, SignedRequestEnvelope};
use crate::blockchain::{signature_hex, KeySigner};
use crate::relay::error::{RelayError, RelayResult};
use crate::relay::transport::HttpTransport;
use crate::relay::types::{TimestampResponse, TIMESTAMP_PATH};

/// Builds [`SignedRequestEnvelope`]s for one signing key.
#[derive(Clone)]
pub struct RequestSigner {
    transport: HttpTransport,
    key: Option<Arc<dyn KeySigner>>,
}

impl RequestSigner {
    pub fn new(transport: HttpTransport, key: Option<Arc<dyn KeySigner>>) -> Self {
        Self { transport, key }
    }

    /// The signing key, or `SigningUnavailable`.
    pub fn key(&self) -> RelayResult<&Arc<dyn KeySigner>> {
        self.key
            .as_ref()
            .ok_or_else(|| RelayError::SigningUnavailable("no signing key configured".to_string()))
    }

    pub fn address(&self) -> RelayResult<Address> {
        Ok(self.key()?.address())
    }

    /// Server's authoritative time as a decimal string of seconds.
    pub async fn current_server_timestamp(&self) -> RelayResult<String> {
        let response = self
            .transport
            .get(TIMESTAMP_PATH)
            .await?
            .ensure_success()
            .map_err(|e| RelayError::TimeSync(e.to_string()))?;

        let parsed: TimestampResponse = serde_json::from_slice(&response.body)
            .map_err(|e| RelayError::TimeSync(format!("malformed timestamp response: {}", e)))?;

        Ok(parsed.timestamp.to_string())
    }

    /// Sign `body` for `method path` at `timestamp`.
    pub fn sign(
        &self,
        method: &Method,
        path: &str,
        timestamp: &str,
        body: &[u8],
    ) -> RelayResult<SignedRequestEnvelope> {
        let key = self.key()?;
        let message = message_to_sign(method.as_str(), path, timestamp, body);
        let signature = key.sign_message(message.as_bytes())?;

        Ok(SignedRequestEnvelope {
            method: method.as_str().to_string(),
            path: path.to_string(),
            timestamp: timestamp.to_string(),
            body_hash: content_hash(body),
            signature: signature_hex(&signature),
            signer_address: key.address(),
        })
    }

    /// Fetch a fresh server timestamp and sign with it.
    ///
    /// The key is checked first so a missing key never costs a round trip.
    pub async fn sign_request(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
    ) -> RelayResult<SignedRequestEnvelope> {
        self.key()?;
        let timestamp = self.current_server_timestamp().await?;
        self.sign(method, path, &timestamp, body)
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("address", &self.key.as_ref().map(|k| k.address()))
            .finish()
    }
}
