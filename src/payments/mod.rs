//! Payment subsystem.
//!
//! # Data Flow
//! ```text
//! PaymentParameters
//!     → orchestrator.rs (skeleton, quote, sign, submit)
//!     → intent.rs (state checks and transitions)
//!     → relay client (network I/O)
//! ```

pub mod intent;
pub mod orchestrator;
pub mod types;

pub use intent::PaymentIntent;
pub use orchestrator::PaymentOrchestrator;
pub use types::{
    PaymentError, PaymentParameters, PaymentQuote, PaymentResult, PaymentStage, PaymentState,
};
