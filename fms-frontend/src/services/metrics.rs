use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder backing `/metrics`.
pub fn init_metrics() {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
    }
}

pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count a stage action (`submit`, `approve`, `tally`, ...) by outcome.
pub fn record_stage_action(stage: &'static str, action: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "fms_stage_actions_total",
        "stage" => stage,
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}
