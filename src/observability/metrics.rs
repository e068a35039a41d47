//! Metrics collection and exposition.
//!
//! # Metrics
//! - `siteconf_fetch_errors_total` (counter): failed fetches by category
//! - `siteconf_update_rejected_total` (counter): documents rejected by a store
//! - `siteconf_updates_total` (counter): accepted documents that changed the value
//! - `siteconf_watchers` (gauge): registered watchers
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::config::Category;

/// Install the Prometheus exporter, serving `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, "Failed to install metrics exporter: {}", e),
    }
}

pub fn record_fetch_error(category: Category) {
    metrics::counter!("siteconf_fetch_errors_total", "category" => category.as_str()).increment(1);
}

pub fn record_rejected(category: Category) {
    metrics::counter!("siteconf_update_rejected_total", "category" => category.as_str())
        .increment(1);
}

pub fn record_update(category: Category) {
    metrics::counter!("siteconf_updates_total", "category" => category.as_str()).increment(1);
}

pub fn record_watchers(count: usize) {
    metrics::gauge!("siteconf_watchers").set(count as f64);
}
