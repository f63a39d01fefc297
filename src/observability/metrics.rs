//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_connections_total` (counter): accepted connections
//! - `proxy_active_connections` (gauge): current connection count
//! - `proxy_relay_bytes_total` (counter): relayed bytes by direction
//! - `proxy_resplit_records_total` (counter): synthetic records produced
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - The exporter is optional; recording without it is a no-op

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Failure to install is logged and otherwise ignored: the proxy keeps
/// serving traffic without an exporter.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!("proxy_connections_total", "Accepted connections");
            describe_gauge!("proxy_active_connections", "Connections currently open");
            describe_counter!("proxy_relay_bytes_total", "Bytes relayed, by direction");
            describe_counter!(
                "proxy_resplit_records_total",
                "Synthetic TLS records produced by splitting"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record an accepted connection.
pub fn record_accept() {
    counter!("proxy_connections_total").increment(1);
    gauge!("proxy_active_connections").increment(1.0);
}

/// Record a finished connection.
pub fn record_close() {
    gauge!("proxy_active_connections").decrement(1.0);
}

/// Record bytes forwarded by one relay direction.
pub fn record_relay(direction: &'static str, bytes: u64) {
    counter!("proxy_relay_bytes_total", "direction" => direction).increment(bytes);
}

/// Record synthetic records produced for one rewritten packet.
pub fn record_resplit(fragments: usize) {
    counter!("proxy_resplit_records_total").increment(fragments as u64);
}
