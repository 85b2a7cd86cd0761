//! Metrics collection.
//!
//! # Metrics
//! - `route_probe_resolutions_total` (counter): resolutions by outcome kind
//! - `route_probe_resolution_duration_seconds` (histogram): time spent resolving
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; no exporter is installed here
//! - Without a recorder the calls are no-ops

use std::time::Duration;

/// Record the outcome of one resolution call.
pub fn record_resolution(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("route_probe_resolutions_total", "outcome" => outcome).increment(1);
    metrics::histogram!("route_probe_resolution_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}
