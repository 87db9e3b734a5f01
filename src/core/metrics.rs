use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) const SESSIONS_STARTED: &str = "exam_sessions_started_total";
pub(crate) const SUBMISSIONS: &str = "exam_submissions_total";
pub(crate) const SESSIONS_ABANDONED: &str = "exam_sessions_abandoned_total";
pub(crate) const NAVIGATION_INTERCEPTED: &str = "exam_navigation_intercepted_total";

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_submission(kind: &'static str, outcome: &'static str) {
    metrics::counter!(SUBMISSIONS, "kind" => kind, "outcome" => outcome).increment(1);
}

pub(crate) fn record_session_started() {
    metrics::counter!(SESSIONS_STARTED).increment(1);
}

pub(crate) fn record_abandoned() {
    metrics::counter!(SESSIONS_ABANDONED).increment(1);
}

pub(crate) fn record_intercepted(origin: &str) {
    metrics::counter!(NAVIGATION_INTERCEPTED, "origin" => origin.to_string()).increment(1);
}
