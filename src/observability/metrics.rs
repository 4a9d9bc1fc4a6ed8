//! Socket-layer counters.
//!
//! # Metrics
//! - `tcp_transfers_total` (counter): timed transfers by direction, outcome
//! - `tcp_transfer_bytes_total` (counter): bytes moved by direction
//! - `tcp_connects_total` (counter): client connects by result
//! - `tcp_accepts_total` (counter): accepted server connections
//!
//! Recording is a no-op until a recorder is installed, which only the
//! server binary does (see [`init_metrics`]).

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::net::Direction;

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_transfer(direction: Direction, outcome: &'static str, bytes: usize) {
    counter!(
        "tcp_transfers_total",
        "direction" => direction.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    if bytes > 0 {
        counter!("tcp_transfer_bytes_total", "direction" => direction.as_str())
            .increment(bytes as u64);
    }
}

pub fn record_connect(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("tcp_connects_total", "result" => result).increment(1);
}

pub fn record_accept() {
    counter!("tcp_accepts_total").increment(1);
}
