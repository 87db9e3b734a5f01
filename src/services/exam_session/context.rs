use std::sync::Arc;

use tokio::sync::Mutex;

use super::errors::SessionError;
use super::guard::{LeaveAttempt, LeaveVerdict, NavigationGuard, UnloadVerdict};
use super::{ExamSessionController, Termination};
use crate::models::ExamId;

/// Holds the single live exam session of one client context.
///
/// Shared components (the navbar, the unload hook) talk to the running exam
/// only through this handle.
#[derive(Clone, Default)]
pub struct SessionContext {
    slot: Arc<Mutex<Option<ExamSessionController>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn begin(&self, controller: &ExamSessionController) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().await;
        if let Some(current) = slot.as_ref().filter(|current| current.is_live()) {
            return Err(SessionError::AlreadyActive { exam_id: current.exam_id() });
        }
        *slot = Some(controller.clone());
        Ok(())
    }

    /// Clears the slot if it still holds `controller`.
    pub(crate) async fn release(&self, controller: &ExamSessionController) {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|current| current.same_session(controller)) {
            *slot = None;
        }
    }

    /// The session that has not terminated yet, if any.
    pub async fn current(&self) -> Option<ExamSessionController> {
        self.slot.lock().await.as_ref().filter(|current| current.is_live()).cloned()
    }

    pub async fn is_session_active(&self) -> bool {
        self.current().await.is_some_and(|current| current.is_active())
    }

    pub async fn active_exam(&self) -> Option<ExamId> {
        self.current().await.map(|current| current.exam_id())
    }

    /// Routes a leave attempt to the running exam; without one, navigation proceeds.
    pub async fn request_exit(&self, attempt: LeaveAttempt) -> LeaveVerdict {
        match self.current().await {
            Some(controller) => controller.on_leave_attempt(attempt).await,
            None => LeaveVerdict::Proceed,
        }
    }

    pub async fn unload(&self) -> UnloadVerdict {
        match self.current().await {
            Some(controller) => controller.on_unload().await,
            None => UnloadVerdict::Proceed,
        }
    }

    /// The student left past the unload warning.
    pub async fn discard(&self) -> Termination {
        match self.current().await {
            Some(controller) => controller.discard().await,
            None => Termination::Suppressed,
        }
    }
}
