//! Error taxonomy for relay calls.

use thiserror::Error;

use crate::blockchain::BlockchainError;
use crate::numeric::NumericError;
use crate::relay::types::ServerError;

/// Errors that can occur while talking to the relay service.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Transport-level failure. `connect` is true when the request never
    /// left this process.
    #[error("Network error: {message}")]
    Network { message: String, connect: bool },

    /// Transport deadline elapsed before a response arrived.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Non-2xx response.
    #[error("Relay returned {status}: {message}")]
    Protocol { status: u16, message: String },

    /// 2xx response whose body does not have the expected shape.
    #[error("Malformed response from {path}: {reason}")]
    MalformedResponse { path: String, reason: String },

    /// The server refused to build a transaction skeleton.
    #[error("Skeleton build failed ({status}): {server_message}")]
    SkeletonBuild { status: u16, server_message: String },

    /// The server rejected a broadcast. Only the first reported error is kept.
    #[error("Broadcast rejected: {0}")]
    Rejected(ServerError),

    /// The broadcast may or may not have been accepted.
    #[error("Broadcast outcome unknown: {0}")]
    AmbiguousSubmission(String),

    /// Hex or decimal value could not be decoded.
    #[error(transparent)]
    Numeric(#[from] NumericError),

    /// No key is available to sign an authenticated request.
    #[error("Signing unavailable: {0}")]
    SigningUnavailable(String),

    /// Server time could not be obtained.
    #[error("Time sync failed: {0}")]
    TimeSync(String),

    /// Address failed validation.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Client could not be constructed from configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RelayError {
    /// Transport failures that an idempotent request may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, RelayError::Network { .. } | RelayError::Timeout(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Network { .. } => "network",
            RelayError::Timeout(_) => "timeout",
            RelayError::Protocol { .. } => "protocol",
            RelayError::MalformedResponse { .. } => "malformed",
            RelayError::SkeletonBuild { .. } => "skeleton",
            RelayError::Rejected(_) => "rejected",
            RelayError::AmbiguousSubmission(_) => "ambiguous",
            RelayError::Numeric(_) => "numeric",
            RelayError::SigningUnavailable(_) => "signing",
            RelayError::TimeSync(_) => "time_sync",
            RelayError::InvalidAddress(_) => "address",
            RelayError::Config(_) => "config",
        }
    }
}

impl From<BlockchainError> for RelayError {
    fn from(e: BlockchainError) -> Self {
        match e {
            BlockchainError::InvalidAddress(addr) => RelayError::InvalidAddress(addr),
            BlockchainError::SigningUnavailable(msg) => RelayError::SigningUnavailable(msg),
            other => RelayError::SigningUnavailable(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Timeout(e.to_string())
        } else {
            RelayError::Network {
                message: e.to_string(),
                connect: e.is_connect(),
            }
        }
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
