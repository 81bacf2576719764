//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): dispatched requests by service, method, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end dispatch latency
//! - `gateway_upstream_errors_total` (counter): dispatch failures by service, kind
//! - `gateway_service_health` (gauge): 1=healthy, 0=unhealthy, per registered service
//!
//! Without an installed recorder every call is a no-op, so tests need no setup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    let builder = match PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets(LATENCY_BUCKETS)
    {
        Ok(builder) => builder,
        Err(e) => {
            tracing::error!(error = %e, "Invalid histogram buckets, metrics disabled");
            return;
        }
    };

    match builder.install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

fn describe_metrics() {
    describe_counter!("gateway_requests_total", "Total number of dispatched requests");
    describe_histogram!(
        "gateway_request_duration_seconds",
        "Dispatch duration in seconds, upstream call included"
    );
    describe_counter!(
        "gateway_upstream_errors_total",
        "Dispatches that ended in a gateway-side error"
    );
    describe_gauge!("gateway_service_health", "Registry health state (1=healthy)");
}

/// Record a completed dispatch.
pub fn record_request(service: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "service" => service.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "service" => service.to_string(),
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a dispatch failure.
pub fn record_upstream_error(service: &str, kind: &'static str) {
    counter!(
        "gateway_upstream_errors_total",
        "service" => service.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// Record the latest health check result for a registered service.
pub fn record_service_health(service: &str, healthy: bool) {
    gauge!("gateway_service_health", "service" => service.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
