use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_session_created() {
    metrics::counter!("sessions_created_total").increment(1);
}

pub(crate) fn record_otp_verification(outcome: &'static str) {
    metrics::counter!("otp_verifications_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_answer(is_correct: bool) {
    let label = if is_correct { "true" } else { "false" };
    metrics::counter!("answers_recorded_total", "correct" => label).increment(1);
}

pub(crate) fn record_session_finished(percentage: f64) {
    metrics::counter!("sessions_finished_total").increment(1);
    metrics::histogram!("session_score_percentage").record(percentage);
}
