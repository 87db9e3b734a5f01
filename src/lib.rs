pub(crate) mod core;
pub mod models;
pub mod navigation;
pub mod schemas;
pub mod services;
pub mod terminal;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;

pub use crate::core::config::{ConfigError, Settings};
pub use crate::core::state::AppState;

use crate::core::telemetry;
use crate::models::ExamId;
use crate::navigation::RouteHistory;
use crate::services::exam_session::SessionContext;
use crate::services::results_api::HttpResultsApi;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let exam_id: ExamId = std::env::args()
        .nth(1)
        .context("usage: exam-portal <exam-id>")?
        .parse()
        .context("exam id must be an integer")?;

    let api = HttpResultsApi::from_settings(&settings)?;
    let history = RouteHistory::new(settings.navigation().start_route.clone());
    let state = AppState::new(Arc::new(api), Arc::new(history), SessionContext::new());

    tracing::info!(
        api = %settings.api().base_url,
        environment = %settings.runtime().environment.as_str(),
        exam_id = %exam_id,
        "Exam portal client starting"
    );

    let result = terminal::take_exam(&state, exam_id).await;

    if let Some(rendered) = core::metrics::render() {
        tracing::debug!(metrics = %rendered, "Session metrics");
    }

    result
}
