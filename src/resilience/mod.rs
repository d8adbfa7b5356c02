//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to relay:
//!     → reqwest client timeouts (connect + total request)
//!     → On transport failure: retries.rs (idempotent GETs only, backoff.rs delay)
//!     → POSTs surface the failure untouched
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every call has a deadline
//! - Broadcasts are never retried: a lost response does not mean a lost transaction

pub mod backoff;
pub mod retries;

pub use retries::{is_retryable, with_retries};
