//! Canonical message-to-sign and the signed-request headers.

use alloy::primitives::{hex, keccak256, Address, B256};
use serde::Serialize;

use crate::blockchain::address_hex;

pub const HEADER_ADDRESS: &str = "Token-ID-Address";
pub const HEADER_SIGNATURE: &str = "Token-Signature";
pub const HEADER_TIMESTAMP: &str = "Token-Timestamp";

/// Keccak-256 of the exact body bytes.
pub fn content_hash(body: &[u8]) -> B256 {
    keccak256(body)
}

/// `"{METHOD}\n{path}\n{timestamp}\n{0x-hex content hash}"`
pub fn message_to_sign(method: &str, path: &str, timestamp: &str, body: &[u8]) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        method,
        path,
        timestamp,
        hex::encode_prefixed(content_hash(body))
    )
}

/// Authentication material for one request. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedRequestEnvelope {
    pub method: String,
    pub path: String,
    /// Server-supplied seconds, as sent.
    pub timestamp: String,
    pub body_hash: B256,
    /// `0x`-prefixed 65-byte signature.
    pub signature: String,
    pub signer_address: Address,
}

impl SignedRequestEnvelope {
    /// Exactly the three auth headers.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (HEADER_ADDRESS, address_hex(&self.signer_address)),
            (HEADER_SIGNATURE, self.signature.clone()),
            (HEADER_TIMESTAMP, self.timestamp.clone()),
        ]
    }
}
