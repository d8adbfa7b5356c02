//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (CLI)
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Payment intent id flows through spans on every orchestrator step
//! - Metrics are cheap (facade no-ops without a recorder)

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
