use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::state::AppState;
use crate::models::ExamId;
use crate::navigation::{routes, Navigator, RouteHistory};
use crate::schemas::exam::{ExamContent, ExamStartResponse};
use crate::schemas::submission::SubmissionRequest;
use crate::services::exam_session::{ExamSessionController, SessionCallbacks, SessionContext};
use crate::services::results_api::{ResultsApi, ResultsApiError, SubmitAck};

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

/// Start payload with question ids `1..=questions`.
pub(crate) fn start_payload(exam_id: i64, questions: usize, minutes: u32) -> Value {
    let questions: Vec<Value> = (1..=questions)
        .map(|id| {
            json!({
                "id": id,
                "questionText": format!("Question {id}"),
                "optionA": format!("Option A{id}"),
                "optionB": format!("Option B{id}"),
                "optionC": format!("Option C{id}"),
                "optionD": format!("Option D{id}"),
            })
        })
        .collect();

    json!({
        "exam": { "id": exam_id, "name": format!("Exam {exam_id}"), "duration": minutes },
        "questions": questions,
    })
}

pub(crate) fn exam_content(exam_id: i64, questions: usize, minutes: u32) -> ExamContent {
    let response: ExamStartResponse =
        serde_json::from_value(start_payload(exam_id, questions, minutes)).expect("start payload");
    response.into_content().expect("exam content")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    Start(ExamId),
    Submit(ExamId, SubmissionRequest),
    Exit(ExamId, SubmissionRequest),
}

/// Recording Results API double.
#[derive(Default)]
pub(crate) struct MockResultsApi {
    exam: Option<Value>,
    calls: Mutex<Vec<ApiCall>>,
    failures_left: Mutex<usize>,
    latency: Duration,
}

impl MockResultsApi {
    pub(crate) fn with_exam(exam_id: i64, questions: usize, minutes: u32) -> Self {
        Self { exam: Some(start_payload(exam_id, questions, minutes)), ..Self::default() }
    }

    pub(crate) fn with_payload(payload: Value) -> Self {
        Self { exam: Some(payload), ..Self::default() }
    }

    /// Every start request is rejected.
    pub(crate) fn unavailable() -> Self {
        Self::default()
    }

    pub(crate) fn failing_submissions(mut self, count: usize) -> Self {
        self.failures_left = Mutex::new(count);
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) async fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().await.clone()
    }

    /// Submit and exit calls only.
    pub(crate) async fn submissions(&self) -> Vec<ApiCall> {
        self.calls().await.into_iter().filter(|call| !matches!(call, ApiCall::Start(_))).collect()
    }

    async fn record_submission(&self, call: ApiCall) -> Result<SubmitAck, ResultsApiError> {
        self.calls.lock().await.push(call);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut failures_left = self.failures_left.lock().await;
        if *failures_left > 0 {
            *failures_left -= 1;
            return Err(ResultsApiError::Rejected {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(SubmitAck { message: Some("ok".to_string()) })
    }
}

#[async_trait]
impl ResultsApi for MockResultsApi {
    async fn start_exam(&self, exam_id: ExamId) -> Result<ExamStartResponse, ResultsApiError> {
        self.calls.lock().await.push(ApiCall::Start(exam_id));
        let payload = self.exam.clone().ok_or_else(|| ResultsApiError::Rejected {
            status: 404,
            message: "Exam not found".to_string(),
        })?;
        serde_json::from_value(payload).map_err(|err| ResultsApiError::InvalidResponse {
            endpoint: format!("results/exam/{exam_id}/start"),
            reason: err.to_string(),
        })
    }

    async fn submit_exam(
        &self,
        exam_id: ExamId,
        request: &SubmissionRequest,
    ) -> Result<SubmitAck, ResultsApiError> {
        self.record_submission(ApiCall::Submit(exam_id, request.clone())).await
    }

    async fn exit_exam(
        &self,
        exam_id: ExamId,
        request: &SubmissionRequest,
    ) -> Result<SubmitAck, ResultsApiError> {
        self.record_submission(ApiCall::Exit(exam_id, request.clone())).await
    }
}

pub(crate) struct TestContext {
    pub(crate) api: Arc<MockResultsApi>,
    pub(crate) history: Arc<RouteHistory>,
    pub(crate) state: AppState,
}

impl TestContext {
    /// History starts on the exam list; callers open the exam route themselves.
    pub(crate) fn new(api: MockResultsApi) -> Self {
        let api = Arc::new(api);
        let history = Arc::new(RouteHistory::new(routes::STUDENT_EXAMS));
        let state = AppState::new(api.clone(), history.clone(), SessionContext::new());
        Self { api, history, state }
    }

    pub(crate) async fn launch(
        &self,
        exam_id: i64,
        callbacks: SessionCallbacks,
    ) -> Result<ExamSessionController, crate::services::exam_session::SessionError> {
        let exam_id = ExamId::new(exam_id);
        self.history.go_to(&routes::exam_route(exam_id));
        ExamSessionController::start(&self.state, exam_id, callbacks).await
    }
}
