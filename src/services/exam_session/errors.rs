use thiserror::Error;

use crate::models::{ExamId, Phase, QuestionId, SubmissionKind};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The exam could not be fetched or its content is unusable. No session exists.
    #[error("Failed to load exam data for exam {exam_id}: {reason}")]
    LoadFailure { exam_id: ExamId, reason: String },
    /// The collaborator rejected a submit or exit; the session is `Active` again.
    #[error("Failed to {}: {detail}", .kind.action())]
    SubmitFailure { kind: SubmissionKind, detail: String, server_message: Option<String> },
    /// A termination trigger arrived after the session left `Active`.
    #[error("exam session is already {}", .phase.as_str())]
    NavigationConflict { phase: Phase },
    #[error("an exam session for exam {exam_id} is already in progress")]
    AlreadyActive { exam_id: ExamId },
    #[error("answers cannot change while the session is {}", .phase.as_str())]
    NotActive { phase: Phase },
    #[error("question {0} is not part of this exam")]
    UnknownQuestion(QuestionId),
}

impl SessionError {
    /// The toast shown to the student.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::LoadFailure { .. } => "Failed to load exam data".to_string(),
            SessionError::SubmitFailure { kind, server_message, .. } => server_message
                .clone()
                .unwrap_or_else(|| format!("Failed to {}", kind.action())),
            other => other.to_string(),
        }
    }
}
