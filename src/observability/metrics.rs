//! Metrics collection and exposition.
//!
//! # Metrics
//! - `orchestrator_provider_calls_total` (counter): calls by provider, outcome
//! - `orchestrator_provider_latency_ms` (histogram): call latency by provider
//! - `orchestrator_provider_skipped_total` (counter): calls skipped on open circuit
//! - `orchestrator_circuit_open` (gauge): 1=open, 0=closed
//! - `orchestrator_pipeline_total` (counter): runs by platform, outcome
//! - `orchestrator_judge_parse_failures_total` (counter)
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exposition is opt-in through configuration

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_provider_call(provider: &str, outcome: &'static str, elapsed: Duration) {
    counter!(
        "orchestrator_provider_calls_total",
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("orchestrator_provider_latency_ms", "provider" => provider.to_string())
        .record(elapsed.as_secs_f64() * 1000.0);
}

pub fn record_provider_skipped(provider: &str) {
    counter!("orchestrator_provider_skipped_total", "provider" => provider.to_string())
        .increment(1);
}

pub fn record_circuit_state(provider: &str, open: bool) {
    gauge!("orchestrator_circuit_open", "provider" => provider.to_string())
        .set(if open { 1.0 } else { 0.0 });
}

pub fn record_pipeline(platform: &str, outcome: &'static str) {
    counter!(
        "orchestrator_pipeline_total",
        "platform" => platform.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_judge_parse_failure() {
    counter!("orchestrator_judge_parse_failures_total").increment(1);
}
