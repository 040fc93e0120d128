//! Prometheus metrics

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Call once at startup, before any
/// metric is recorded.
pub fn init_metrics() -> &'static PrometheusHandle {
    PROMETHEUS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    })
}

/// Render the current metrics snapshot for the `/metrics` endpoint.
pub async fn metrics_handler() -> String {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => handle.render(),
        None => String::new(),
    }
}

/// Count one classified intent with its decision reason.
pub fn record_intent(intent: &'static str, reason: &'static str) {
    counter!("concierge_intents_total", "intent" => intent, "reason" => reason).increment(1);
}

/// Record one completed turn.
pub fn record_turn(endpoint: &'static str, latency: Duration, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("concierge_turns_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
    histogram!("concierge_turn_duration_seconds", "endpoint" => endpoint)
        .record(latency.as_secs_f64());
}
