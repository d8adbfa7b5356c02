//! Request authentication subsystem.
//!
//! # Data Flow
//! ```text
//! body bytes (serialized once by the caller)
//!     → signer.rs (GET /v1/timestamp for the server clock)
//!     → envelope.rs ("METHOD\npath\ntimestamp\nkeccak(body)")
//!     → KeySigner signs keccak(message)
//!     → Token-ID-Address / Token-Signature / Token-Timestamp headers
//!     → the same body bytes go on the wire
//! ```
//!
//! # Design Decisions
//! - Timestamps come from the server, never the local clock
//! - An envelope is built per request and never cached
//! - No key means no request; there is no unsigned fallback

pub mod envelope;
pub mod signer;

pub use envelope::{content_hash, message_to_sign, SignedRequestEnvelope};
pub use signer::RequestSigner;
