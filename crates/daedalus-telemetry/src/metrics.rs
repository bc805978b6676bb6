//! Dispatch metrics.
//!
//! Metrics go through the `metrics` facade. The library installs no
//! recorder; the embedding process chooses an exporter, and without one
//! every call here is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `daedalus_requests_total` | Counter | `operation`, `status` | Dispatched requests |
//! | `daedalus_request_duration_seconds` | Histogram | `operation` | Dispatch latency |
//! | `daedalus_in_flight_requests` | Gauge | - | Requests being dispatched |
//! | `daedalus_validation_failures_total` | Counter | `operation` | Rejected requests |

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "daedalus_requests_total";
/// Latency histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "daedalus_request_duration_seconds";
/// In-flight gauge name.
pub const IN_FLIGHT_REQUESTS: &str = "daedalus_in_flight_requests";
/// Validation failure counter name.
pub const VALIDATION_FAILURES_TOTAL: &str = "daedalus_validation_failures_total";

/// Operation label for requests that matched no route.
pub const UNMATCHED_OPERATION: &str = "unmatched";

/// Registers descriptions for all standard metrics with the installed
/// recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Dispatch duration in seconds");
    describe_gauge!(IN_FLIGHT_REQUESTS, "Number of requests currently being dispatched");
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Total requests rejected by schema validation"
    );
}

/// Records a completed dispatch.
pub fn record_dispatch(operation: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a request rejected by validation.
pub fn record_validation_failure(operation: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Holds the in-flight gauge up for its lifetime.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(REQUESTS_TOTAL, "daedalus_requests_total");
        assert_eq!(REQUEST_DURATION_SECONDS, "daedalus_request_duration_seconds");
    }

    #[test]
    fn test_record_without_recorder() {
        describe_metrics();
        record_dispatch("getPets", 200, Duration::from_millis(3));
        record_dispatch(UNMATCHED_OPERATION, 404, Duration::ZERO);
        record_validation_failure("createPet");
    }

    #[test]
    fn test_in_flight_guard() {
        let guard = InFlightGuard::new();
        drop(guard);
    }
}
