//! Local private-key signer.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::{Signature, SignerSync};

use crate::blockchain::types::{BlockchainError, BlockchainResult, KeySigner};

/// Default environment variable holding the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "RELAY_WALLET_PRIVATE_KEY";

/// Wallet backed by an in-memory secp256k1 key.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self { signer })
    }

    /// Load the wallet from the named environment variable.
    pub fn from_env(var: &str) -> BlockchainResult<Self> {
        let private_key = std::env::var(var).map_err(|_| {
            BlockchainError::SigningUnavailable(format!("Environment variable {} not set", var))
        })?;

        Self::from_private_key(&private_key)
    }
}

impl KeySigner for Wallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn sign_hash(&self, hash: &B256) -> BlockchainResult<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| BlockchainError::SigningUnavailable(format!("Signing failed: {}", e)))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}
