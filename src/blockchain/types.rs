//! Address handling, the key-signing capability, and error definitions.

use alloy::primitives::{hex, keccak256, Address, B256};
use alloy::signers::Signature;
use thiserror::Error;

/// Errors that can occur while validating addresses or signing.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Recipient or signer address is not `0x` followed by 40 hex characters.
    #[error("Invalid address '{0}': expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    /// The external key-signing capability is absent or refused to sign.
    #[error("Signing unavailable: {0}")]
    SigningUnavailable(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Unsigned transaction is not valid hex.
    #[error("Invalid transaction hex: {0}")]
    InvalidTransaction(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// An external key that can produce recoverable ECDSA signatures.
///
/// Implementations must be reentrant; the crate shares one instance across
/// tasks without extra locking.
pub trait KeySigner: Send + Sync + std::fmt::Debug {
    /// Address derived from the public key.
    fn address(&self) -> Address;

    /// Sign a 32-byte digest.
    fn sign_hash(&self, hash: &B256) -> BlockchainResult<Signature>;

    /// Sign `keccak256(message)`.
    fn sign_message(&self, message: &[u8]) -> BlockchainResult<Signature> {
        self.sign_hash(&keccak256(message))
    }

    /// Sign the Keccak-256 digest of a hex-encoded unsigned transaction.
    fn sign_transaction_hex(&self, unsigned_hex: &str) -> BlockchainResult<Signature> {
        let bytes = hex::decode(unsigned_hex)
            .map_err(|e| BlockchainError::InvalidTransaction(format!("{}: {}", unsigned_hex, e)))?;
        if bytes.is_empty() {
            return Err(BlockchainError::InvalidTransaction("empty transaction".to_string()));
        }
        self.sign_hash(&keccak256(&bytes))
    }
}

/// Parse and validate an address: `0x` prefix, 42 characters, hex body.
///
/// Case is not significant; checksums are not enforced.
pub fn parse_address(input: &str) -> BlockchainResult<Address> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| BlockchainError::InvalidAddress(input.to_string()))?;

    if trimmed.len() != 42 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BlockchainError::InvalidAddress(input.to_string()));
    }

    let bytes = hex::decode(body).map_err(|_| BlockchainError::InvalidAddress(input.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Lower-case `0x` form used on the wire and in auth headers.
pub fn address_hex(address: &Address) -> String {
    hex::encode_prefixed(address.as_slice())
}

/// `0x`-prefixed 65-byte `r || s || v` encoding.
pub fn signature_hex(signature: &Signature) -> String {
    hex::encode_prefixed(signature.as_bytes())
}
