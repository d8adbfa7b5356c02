//! Metrics collection.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by method and status/error kind
//! - `relay_request_duration_seconds` (histogram): latency distribution
//! - `relay_broadcasts_total` (counter): broadcast outcomes
//! - `relay_payment_transitions_total` (counter): intent state changes
//!
//! The library only emits through the `metrics` facade; installing a
//! recorder/exporter is up to the embedding application.

use std::time::Duration;

/// Record one completed or failed relay request.
pub fn record_request(method: &str, outcome: &str, elapsed: Duration) {
    metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

/// Record a broadcast outcome (accepted, rejected, ambiguous, protocol_error).
pub fn record_broadcast(outcome: &'static str) {
    metrics::counter!("relay_broadcasts_total", "outcome" => outcome).increment(1);
}

/// Record a payment intent entering `state`.
pub fn record_payment_transition(state: &'static str) {
    metrics::counter!("relay_payment_transitions_total", "state" => state).increment(1);
}
