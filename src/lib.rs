//! Relay transaction client library.
//!
//! Talks to an Ethereum-style relay service: builds unsigned transaction
//! skeletons, signs and broadcasts them, reads balances, and drives a
//! payment from quote to submission.

// Core subsystems
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod numeric;
pub mod payments;
pub mod relay;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;

pub use config::RelayConfig;
pub use payments::PaymentOrchestrator;
pub use relay::{RelayClient, RelayError};
