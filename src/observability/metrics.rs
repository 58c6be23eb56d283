//! Metrics collection and exposition.
//!
//! # Metrics
//! - `categorizer_classifications_total` (counter): calls by outcome
//! - `categorizer_classification_duration_seconds` (histogram): fan-out/fan-in latency
//! - `categorizer_filter_matches_total` (counter): matches by category
//! - `categorizer_http_requests_total` (counter): requests by method, status
//! - `categorizer_http_request_duration_seconds` (histogram): handler latency

use std::net::SocketAddr;
use std::time::Instant;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one `classify` call.
///
/// `outcome` is one of `complete`, `empty`, `partial`, `timeout`, `lost`.
pub fn record_classification(outcome: &'static str, start: Instant) {
    metrics::counter!("categorizer_classifications_total", "outcome" => outcome).increment(1);
    metrics::histogram!("categorizer_classification_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_filter_match(category: &str) {
    metrics::counter!("categorizer_filter_matches_total", "category" => category.to_string())
        .increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "categorizer_http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("categorizer_http_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
