//! Relay service integration.
//!
//! # Data Flow
//! ```text
//! SkeletonParams / signed tx / address
//!     → client.rs (operation semantics, error mapping)
//!     → auth::RequestSigner (signed paths only)
//!     → transport.rs (reqwest, timeouts, GET retries)
//!     → types.rs (wire JSON ↔ Amount / Address)
//! ```
//!
//! # Error Policy
//! - Malformed responses are errors, never panics
//! - Broadcast is never retried; lost responses become AmbiguousSubmission
//! - Only the first structured error of a rejection is surfaced

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::RelayClient;
pub use error::{RelayError, RelayResult};
pub use types::{
    Balance, ServerError, SkeletonParams, TransactionReceiptRef, TransactionSkeleton,
};
