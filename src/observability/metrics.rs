//! Metrics collection and exposition.
//!
//! # Metrics
//! - `probe_requests_total` (counter): requests by route and status
//! - `probe_request_duration_seconds` (histogram): handler latency by route
//! - `probe_in_flight_requests` (gauge): handlers currently executing
//!
//! The recorder is only installed when a metrics address is configured;
//! until then every macro call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "probe_requests_total";
pub const REQUEST_DURATION: &str = "probe_request_duration_seconds";
pub const IN_FLIGHT: &str = "probe_in_flight_requests";

/// Install the Prometheus recorder with its own scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(route: &'static str, status: u16, start_time: Instant) {
    counter!(REQUESTS_TOTAL, "route" => route, "status" => status.to_string()).increment(1);
    histogram!(REQUEST_DURATION, "route" => route).record(start_time.elapsed().as_secs_f64());
}

pub fn set_in_flight(count: usize) {
    gauge!(IN_FLIGHT).set(count as f64);
}
