//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define agent metrics (exchanges, latency, body bytes, archive writes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `agent_exchanges_total` (counter): exchanges by method, status
//! - `agent_exchange_duration_seconds` (histogram): latency distribution
//! - `agent_response_bytes_total` (counter): bytes through the body decorator
//! - `agent_archive_writes_total` (counter): archive attempts by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - Labels kept low-cardinality (no paths)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_exchange(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("agent_exchanges_total", &labels).increment(1);
    metrics::histogram!("agent_exchange_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_body_bytes(bytes: usize) {
    metrics::counter!("agent_response_bytes_total").increment(bytes as u64);
}

pub fn record_archive_write(outcome: &'static str) {
    metrics::counter!("agent_archive_writes_total", "outcome" => outcome).increment(1);
}
