//! Chain primitives and the key-signing capability.
//!
//! # Data Flow
//! ```text
//! Environment Variable (private key)
//!     → wallet.rs (key loading, KeySigner impl)
//!     → Arc<dyn KeySigner> shared by auth/ and payments/
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - Signing is local; no network access from this module

pub mod types;
pub mod wallet;

pub use types::{
    address_hex, parse_address, signature_hex, BlockchainError, BlockchainResult, KeySigner,
};
pub use wallet::Wallet;
