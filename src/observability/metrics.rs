//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency, upstream calls, registry size)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `oauth_proxy_requests_total` (counter): inbound requests by route, status
//! - `oauth_proxy_request_duration_seconds` (histogram): inbound latency
//! - `oauth_proxy_upstream_requests_total` (counter): upstream calls by endpoint, outcome
//! - `oauth_proxy_registry_tokens` (gauge): tokens held by the registry
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - Labels stay low-cardinality: matched route, never the raw path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "oauth_proxy_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "oauth_proxy_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one upstream round trip. `outcome` is a status code or "error".
pub fn record_upstream_call(endpoint: &'static str, outcome: String) {
    metrics::counter!(
        "oauth_proxy_upstream_requests_total",
        "endpoint" => endpoint,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_registry_size(size: usize) {
    metrics::gauge!("oauth_proxy_registry_tokens").set(size as f64);
}
