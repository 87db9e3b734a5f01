use std::sync::Arc;

use crate::navigation::Navigator;
use crate::services::exam_session::SessionContext;
use crate::services::results_api::ResultsApi;

/// Collaborators shared by every exam session launched from one client context.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    api: Arc<dyn ResultsApi>,
    navigator: Arc<dyn Navigator>,
    sessions: SessionContext,
}

impl AppState {
    pub fn new(
        api: Arc<dyn ResultsApi>,
        navigator: Arc<dyn Navigator>,
        sessions: SessionContext,
    ) -> Self {
        Self { inner: Arc::new(InnerState { api, navigator, sessions }) }
    }

    pub fn api(&self) -> &Arc<dyn ResultsApi> {
        &self.inner.api
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    pub fn sessions(&self) -> &SessionContext {
        &self.inner.sessions
    }
}
