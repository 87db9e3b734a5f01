use serde::Serialize;

use crate::models::{OptionLabel, QuestionId, SubmissionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_id: QuestionId,
    pub selected_option: Option<OptionLabel>,
}

/// Body shared by the submit and exit endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequest {
    pub answers: Vec<AnswerEntry>,
    /// Seconds. The portal API names this field `timeTaken`.
    #[serde(rename = "timeTaken")]
    pub time_taken_seconds: u32,
}

/// Snapshot taken when a session latches into `Submitting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub kind: SubmissionKind,
    pub request: SubmissionRequest,
}

impl SubmissionPayload {
    pub fn answered_count(&self) -> usize {
        self.request.answers.iter().filter(|entry| entry.selected_option.is_some()).count()
    }
}

/// What the client keeps after the collaborator accepted a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub kind: SubmissionKind,
    pub time_taken_seconds: u32,
    pub answered: usize,
    pub server_message: Option<String>,
}
