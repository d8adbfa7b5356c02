//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay
//! client. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay service endpoint and transport timeouts.
    pub api: ApiConfig,

    /// Retry configuration for idempotent requests.
    pub retries: RetryConfig,

    /// Signing key location.
    pub wallet: WalletConfig,

    /// Payment display settings.
    pub payments: PaymentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Relay service endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, including any path prefix (e.g., "https://relay.example/api").
    pub base_url: String,

    /// Request timeout (total time for request/response) in milliseconds.
    pub request_timeout_ms: u64,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://token-eth-service.herokuapp.com".to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Retry configuration.
///
/// Only idempotent GETs are ever retried; broadcasts never are.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key.
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Payment display configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Display currency code.
    pub currency: String,

    /// Price of one ether in `currency`, as a decimal string.
    pub exchange_rate: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            exchange_rate: "0".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
