//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirect_requests_total` (counter): requests by outcome, status, source type
//! - `redirect_access_log_failures_total` (counter): access log writes that failed
//! - `redirect_rule_store_failures_total` (counter): rule store queries that failed
//! - `redirect_rules_loaded` (gauge): rules in the current snapshot
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter runs its own listener

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::rules::model::SourceType;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_redirect(status: u16, source_type: SourceType) {
    counter!(
        "redirect_requests_total",
        "outcome" => "redirect",
        "status" => status.to_string(),
        "source_type" => source_type.as_str()
    )
    .increment(1);
}

pub fn record_passthrough() {
    counter!(
        "redirect_requests_total",
        "outcome" => "passthrough",
        "status" => "none",
        "source_type" => "none"
    )
    .increment(1);
}

pub fn record_access_log_failure() {
    counter!("redirect_access_log_failures_total").increment(1);
}

pub fn record_rule_store_failure() {
    counter!("redirect_rule_store_failures_total").increment(1);
}

pub fn record_rules_loaded(count: usize) {
    gauge!("redirect_rules_loaded").set(count as f64);
}
