use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, Instant};
use uuid::Uuid;

use super::errors::SessionError;
use super::guard::{ExitChoice, LeaveAttempt, LeaveVerdict, NavigationGuard, UnloadVerdict, UNLOAD_WARNING};
use super::state::{ExamSession, Tick};
use super::SessionContext;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::models::{ExamId, ExamInfo, OptionLabel, Phase, Question, QuestionId, QuestionStatus, SubmissionKind};
use crate::navigation::{routes, Navigator};
use crate::schemas::submission::SubmissionReceipt;
use crate::services::results_api::ResultsApi;

const TICK: Duration = Duration::from_secs(1);

type SubmittedHook = Box<dyn Fn(&SubmissionReceipt) + Send + Sync>;
type AbandonedHook = Box<dyn Fn() + Send + Sync>;

/// Completion hooks for the surrounding application.
#[derive(Default)]
pub struct SessionCallbacks {
    submitted: Option<SubmittedHook>,
    abandoned: Option<AbandonedHook>,
}

impl SessionCallbacks {
    pub fn on_submitted(mut self, hook: impl Fn(&SubmissionReceipt) + Send + Sync + 'static) -> Self {
        self.submitted = Some(Box::new(hook));
        self
    }

    pub fn on_abandoned(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.abandoned = Some(Box::new(hook));
        self
    }
}

/// How a termination request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Submitted(SubmissionReceipt),
    Abandoned,
    /// The view was closed past the unload warning; nothing was sent.
    Discarded,
    /// Another trigger already latched the session; nothing was done.
    Suppressed,
}

/// Read-only snapshot for rendering the exam header and progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub exam_name: String,
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub answered: usize,
    pub total: usize,
    pub progress: f64,
    pub prompt_open: bool,
    pub last_error: Option<String>,
}

impl SessionView {
    pub fn progress_percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}

/// Owns one exam attempt: countdown, answers, exit prompt and the single terminal submission.
#[derive(Clone)]
pub struct ExamSessionController {
    inner: Arc<Inner>,
}

struct Inner {
    exam_id: ExamId,
    attempt_id: Uuid,
    api: Arc<dyn ResultsApi>,
    navigator: Arc<dyn Navigator>,
    sessions: SessionContext,
    callbacks: SessionCallbacks,
    state: Mutex<ControllerState>,
    phase_tx: watch::Sender<Phase>,
}

struct ControllerState {
    session: ExamSession,
    prompt: Option<LeaveAttempt>,
    last_error: Option<String>,
}

impl ExamSessionController {
    /// Loads the exam and starts the countdown. On failure the navigator is sent back to the
    /// exam list and no session exists.
    pub async fn start(
        state: &AppState,
        exam_id: ExamId,
        callbacks: SessionCallbacks,
    ) -> Result<Self, SessionError> {
        if let Some(active) = state.sessions().current().await {
            return Err(SessionError::AlreadyActive { exam_id: active.exam_id() });
        }

        let content = match state.api().start_exam(exam_id).await {
            Ok(response) => response.into_content(),
            Err(err) => Err(err.to_string()),
        };
        let content = match content {
            Ok(content) => content,
            Err(reason) => {
                tracing::warn!(exam_id = %exam_id, error = %reason, "Failed to load exam data");
                state.navigator().go_to(routes::STUDENT_EXAMS);
                return Err(SessionError::LoadFailure { exam_id, reason });
            }
        };

        let session = ExamSession::start(content, OffsetDateTime::now_utc());
        let attempt_id = session.attempt_id();
        let (phase_tx, _) = watch::channel(session.phase());

        let controller = Self {
            inner: Arc::new(Inner {
                exam_id,
                attempt_id,
                api: state.api().clone(),
                navigator: state.navigator().clone(),
                sessions: state.sessions().clone(),
                callbacks,
                state: Mutex::new(ControllerState { session, prompt: None, last_error: None }),
                phase_tx,
            }),
        };

        state.sessions().begin(&controller).await?;
        controller.spawn_countdown();

        metrics::record_session_started();
        {
            let guard = controller.inner.state.lock().await;
            tracing::info!(
                exam_id = %exam_id,
                attempt_id = %attempt_id,
                questions = guard.session.questions().len(),
                duration_seconds = guard.session.exam().duration_seconds,
                started_at = %crate::core::time::format_offset(guard.session.started_at()),
                "Exam session started"
            );
        }

        Ok(controller)
    }

    pub fn exam_id(&self) -> ExamId {
        self.inner.exam_id
    }

    pub fn attempt_id(&self) -> Uuid {
        self.inner.attempt_id
    }

    pub fn phase(&self) -> Phase {
        *self.inner.phase_tx.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.phase() == Phase::Active
    }

    pub(crate) fn is_live(&self) -> bool {
        self.phase() != Phase::Terminated
    }

    pub(crate) fn same_session(&self, other: &ExamSessionController) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.inner.phase_tx.subscribe()
    }

    /// Resolves once the session reached `Terminated`.
    pub async fn wait_terminated(&self) {
        let mut rx = self.subscribe_phase();
        if rx.wait_for(|phase| *phase == Phase::Terminated).await.is_err() {
            tracing::debug!(attempt_id = %self.inner.attempt_id, "Phase channel closed");
        }
    }

    pub async fn exam(&self) -> ExamInfo {
        self.inner.state.lock().await.session.exam().clone()
    }

    pub async fn questions(&self) -> Vec<Question> {
        self.inner.state.lock().await.session.questions().to_vec()
    }

    pub async fn answer(&self, question_id: QuestionId) -> Option<OptionLabel> {
        self.inner.state.lock().await.session.answer(question_id)
    }

    pub async fn question_status(&self, question_id: QuestionId) -> Option<QuestionStatus> {
        self.inner.state.lock().await.session.question_status(question_id)
    }

    pub async fn view(&self) -> SessionView {
        let guard = self.inner.state.lock().await;
        let session = &guard.session;
        SessionView {
            exam_name: session.exam().name.clone(),
            phase: session.phase(),
            remaining_seconds: session.remaining_seconds(),
            answered: session.answered_count(),
            total: session.questions().len(),
            progress: session.progress(),
            prompt_open: guard.prompt.is_some(),
            last_error: guard.last_error.clone(),
        }
    }

    pub async fn select_answer(
        &self,
        question_id: QuestionId,
        option: OptionLabel,
    ) -> Result<(), SessionError> {
        let mut guard = self.inner.state.lock().await;
        guard.session.select_answer(question_id, option)?;
        tracing::debug!(
            attempt_id = %self.inner.attempt_id,
            question_id = %question_id,
            option = %option,
            "Answer selected"
        );
        Ok(())
    }

    /// "Submit Exam": every question, unanswered ones as `null`.
    pub async fn submit(&self) -> Result<Termination, SessionError> {
        self.terminate_with(SubmissionKind::Full).await
    }

    /// "Exit & Submit": answered questions only.
    pub async fn exit_and_submit(&self) -> Result<Termination, SessionError> {
        self.terminate_with(SubmissionKind::Partial).await
    }

    /// "Go Back": ends the attempt without saving anything.
    pub async fn abandon(&self) -> Result<Termination, SessionError> {
        {
            let mut guard = self.inner.state.lock().await;
            match guard.session.abandon() {
                Ok(()) => guard.prompt = None,
                Err(SessionError::NavigationConflict { phase }) => {
                    tracing::debug!(
                        attempt_id = %self.inner.attempt_id,
                        phase = phase.as_str(),
                        "Abandon ignored"
                    );
                    return Ok(Termination::Suppressed);
                }
                Err(err) => return Err(err),
            }
        }

        self.inner.phase_tx.send_replace(Phase::Terminated);
        self.inner.sessions.release(self).await;
        metrics::record_abandoned();
        tracing::info!(
            exam_id = %self.inner.exam_id,
            attempt_id = %self.inner.attempt_id,
            "Exam session abandoned without saving"
        );

        self.inner.navigator.go_back();
        if let Some(hook) = &self.inner.callbacks.abandoned {
            hook();
        }
        Ok(Termination::Abandoned)
    }

    /// Ends an active attempt after the student closed the view anyway. No request is
    /// sent, the countdown stops and the navigator is left alone.
    pub async fn discard(&self) -> Termination {
        {
            let mut guard = self.inner.state.lock().await;
            if let Err(err) = guard.session.abandon() {
                tracing::debug!(attempt_id = %self.inner.attempt_id, error = %err, "Discard ignored");
                return Termination::Suppressed;
            }
            guard.prompt = None;
        }

        self.inner.phase_tx.send_replace(Phase::Terminated);
        self.inner.sessions.release(self).await;
        metrics::record_abandoned();
        tracing::warn!(
            exam_id = %self.inner.exam_id,
            attempt_id = %self.inner.attempt_id,
            "Exam view closed during active session; nothing was submitted"
        );
        Termination::Discarded
    }

    /// Opens the exit prompt while the session is active.
    pub async fn request_exit(&self, attempt: LeaveAttempt) -> LeaveVerdict {
        let mut guard = self.inner.state.lock().await;
        if guard.session.phase() != Phase::Active {
            return LeaveVerdict::Proceed;
        }

        tracing::info!(
            attempt_id = %self.inner.attempt_id,
            origin = attempt.as_str(),
            destination = attempt.destination().unwrap_or(""),
            "Navigation intercepted"
        );
        metrics::record_intercepted(attempt.as_str());
        if guard.prompt.is_none() {
            guard.prompt = Some(attempt);
        }
        LeaveVerdict::Intercepted
    }

    /// Applies the student's answer to the exit prompt. `Continue` yields `None`.
    pub async fn resolve_prompt(
        &self,
        choice: ExitChoice,
    ) -> Result<Option<Termination>, SessionError> {
        match choice {
            ExitChoice::Continue => {
                self.inner.state.lock().await.prompt = None;
                Ok(None)
            }
            ExitChoice::GoBack => self.abandon().await.map(Some),
            ExitChoice::ExitAndSubmit => self.exit_and_submit().await.map(Some),
        }
    }

    async fn terminate_with(&self, kind: SubmissionKind) -> Result<Termination, SessionError> {
        let (payload, destination) = {
            let mut guard = self.inner.state.lock().await;
            let payload = match guard.session.begin_submission(kind) {
                Ok(payload) => payload,
                Err(SessionError::NavigationConflict { phase }) => {
                    tracing::debug!(
                        attempt_id = %self.inner.attempt_id,
                        kind = kind.as_str(),
                        phase = phase.as_str(),
                        "Termination trigger ignored"
                    );
                    return Ok(Termination::Suppressed);
                }
                Err(err) => return Err(err),
            };
            let prompt = guard.prompt.take();
            let destination = match kind {
                SubmissionKind::Partial => {
                    prompt.as_ref().and_then(LeaveAttempt::destination).map(ToString::to_string)
                }
                SubmissionKind::Full => None,
            };
            (payload, destination)
        };
        self.inner.phase_tx.send_replace(Phase::Submitting);

        tracing::info!(
            exam_id = %self.inner.exam_id,
            attempt_id = %self.inner.attempt_id,
            kind = kind.as_str(),
            answers = payload.request.answers.len(),
            answered = payload.answered_count(),
            time_taken_seconds = payload.request.time_taken_seconds,
            "Submitting exam"
        );

        let result = match kind {
            SubmissionKind::Full => {
                self.inner.api.submit_exam(self.inner.exam_id, &payload.request).await
            }
            SubmissionKind::Partial => {
                self.inner.api.exit_exam(self.inner.exam_id, &payload.request).await
            }
        };

        match result {
            Ok(ack) => {
                {
                    let mut guard = self.inner.state.lock().await;
                    guard.session.complete_submission();
                    guard.last_error = None;
                }
                self.inner.phase_tx.send_replace(Phase::Terminated);
                self.inner.sessions.release(self).await;
                metrics::record_submission(kind.as_str(), "success");

                let receipt = SubmissionReceipt {
                    kind,
                    time_taken_seconds: payload.request.time_taken_seconds,
                    answered: payload.answered_count(),
                    server_message: ack.message,
                };
                tracing::info!(
                    exam_id = %self.inner.exam_id,
                    attempt_id = %self.inner.attempt_id,
                    kind = kind.as_str(),
                    "Exam submission accepted"
                );

                self.inner.navigator.go_to(destination.as_deref().unwrap_or(routes::STUDENT_RESULTS));
                if let Some(hook) = &self.inner.callbacks.submitted {
                    hook(&receipt);
                }
                Ok(Termination::Submitted(receipt))
            }
            Err(err) => {
                let failure = SessionError::SubmitFailure {
                    kind,
                    detail: err.to_string(),
                    server_message: err.server_message().map(ToString::to_string),
                };
                {
                    let mut guard = self.inner.state.lock().await;
                    guard.session.fail_submission();
                    guard.last_error = Some(failure.user_message());
                }
                self.inner.phase_tx.send_replace(Phase::Active);
                metrics::record_submission(kind.as_str(), "failure");
                tracing::warn!(
                    exam_id = %self.inner.exam_id,
                    attempt_id = %self.inner.attempt_id,
                    kind = kind.as_str(),
                    error = %err,
                    "Exam submission failed; session reopened"
                );
                Err(failure)
            }
        }
    }

    fn spawn_countdown(&self) {
        let weak = Arc::downgrade(&self.inner);
        let mut phase_rx = self.inner.phase_tx.subscribe();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = phase_rx.changed() => {
                        if changed.is_err() || *phase_rx.borrow() == Phase::Terminated {
                            break;
                        }
                        continue;
                    }
                }

                let Some(inner) = weak.upgrade() else { break };
                let controller = ExamSessionController { inner };
                if !controller.on_tick().await {
                    break;
                }
            }
        });
    }

    /// Returns `false` once the countdown has nothing left to do.
    async fn on_tick(&self) -> bool {
        let tick = {
            let mut guard = self.inner.state.lock().await;
            if guard.session.phase() == Phase::Terminated {
                return false;
            }
            guard.session.tick()
        };

        match tick {
            Tick::Expired => {
                tracing::info!(attempt_id = %self.inner.attempt_id, "Time is up; submitting exam");
                if let Err(err) = self.submit().await {
                    tracing::warn!(
                        attempt_id = %self.inner.attempt_id,
                        error = %err,
                        "Automatic submission failed; waiting for manual retry"
                    );
                }
            }
            Tick::Counting { remaining } if remaining % 60 == 0 => {
                tracing::debug!(attempt_id = %self.inner.attempt_id, remaining, "Countdown");
            }
            Tick::Counting { .. } | Tick::Idle => {}
        }
        true
    }
}

#[async_trait]
impl NavigationGuard for ExamSessionController {
    async fn on_leave_attempt(&self, attempt: LeaveAttempt) -> LeaveVerdict {
        self.request_exit(attempt).await
    }

    async fn on_unload(&self) -> UnloadVerdict {
        if !self.is_active() {
            return UnloadVerdict::Proceed;
        }
        // beforeunload cannot await a request, so leaving here submits nothing.
        tracing::info!(attempt_id = %self.inner.attempt_id, "Unload attempted during active exam");
        UnloadVerdict::Warn(UNLOAD_WARNING)
    }
}
