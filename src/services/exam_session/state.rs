use std::collections::HashMap;

use time::OffsetDateTime;
use uuid::Uuid;

use super::errors::SessionError;
use crate::models::{ExamInfo, OptionLabel, Phase, Question, QuestionId, QuestionStatus, SubmissionKind};
use crate::schemas::exam::ExamContent;
use crate::schemas::submission::{AnswerEntry, SubmissionPayload, SubmissionRequest};

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// The session is not counting (submitting, terminated, or already at zero).
    Idle,
    Counting { remaining: u32 },
    /// This tick took the countdown to zero; the caller must auto-submit.
    Expired,
}

/// In-memory state of one exam attempt.
///
/// `answers[i]` belongs to `questions[i]`, so the answer keys always equal the
/// question identifiers. `phase` is the only latch between competing
/// termination triggers.
#[derive(Debug, Clone)]
pub(crate) struct ExamSession {
    attempt_id: Uuid,
    started_at: OffsetDateTime,
    exam: ExamInfo,
    questions: Vec<Question>,
    positions: HashMap<QuestionId, usize>,
    answers: Vec<Option<OptionLabel>>,
    remaining_seconds: u32,
    phase: Phase,
}

impl ExamSession {
    pub(crate) fn start(content: ExamContent, started_at: OffsetDateTime) -> Self {
        let ExamContent { exam, questions } = content;
        let positions =
            questions.iter().enumerate().map(|(index, question)| (question.id, index)).collect();
        let answers = vec![None; questions.len()];

        Self {
            attempt_id: Uuid::new_v4(),
            started_at,
            remaining_seconds: exam.duration_seconds,
            exam,
            questions,
            positions,
            answers,
            phase: Phase::Active,
        }
    }

    pub(crate) fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub(crate) fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    pub(crate) fn exam(&self) -> &ExamInfo {
        &self.exam
    }

    pub(crate) fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub(crate) fn answer(&self, question_id: QuestionId) -> Option<OptionLabel> {
        self.positions.get(&question_id).and_then(|&index| self.answers[index])
    }

    pub(crate) fn question_status(&self, question_id: QuestionId) -> Option<QuestionStatus> {
        self.positions.get(&question_id).map(|&index| match self.answers[index] {
            Some(_) => QuestionStatus::Answered,
            None => QuestionStatus::Unanswered,
        })
    }

    pub(crate) fn answered_count(&self) -> usize {
        self.answers.iter().filter(|answer| answer.is_some()).count()
    }

    pub(crate) fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.answered_count() as f64 / self.questions.len() as f64
    }

    pub(crate) fn time_taken_seconds(&self) -> u32 {
        self.exam.duration_seconds.saturating_sub(self.remaining_seconds)
    }

    /// Last write wins; does not touch the countdown.
    pub(crate) fn select_answer(
        &mut self,
        question_id: QuestionId,
        option: OptionLabel,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NotActive { phase: self.phase });
        }
        let index = *self
            .positions
            .get(&question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        self.answers[index] = Some(option);
        Ok(())
    }

    pub(crate) fn tick(&mut self) -> Tick {
        if self.phase != Phase::Active || self.remaining_seconds == 0 {
            return Tick::Idle;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            Tick::Expired
        } else {
            Tick::Counting { remaining: self.remaining_seconds }
        }
    }

    /// Latches `Active -> Submitting` and snapshots what must be sent.
    pub(crate) fn begin_submission(
        &mut self,
        kind: SubmissionKind,
    ) -> Result<SubmissionPayload, SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NavigationConflict { phase: self.phase });
        }
        self.phase = Phase::Submitting;

        let answers = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(_, answer)| kind == SubmissionKind::Full || answer.is_some())
            .map(|(question, answer)| AnswerEntry {
                question_id: question.id,
                selected_option: *answer,
            })
            .collect();

        Ok(SubmissionPayload {
            kind,
            request: SubmissionRequest { answers, time_taken_seconds: self.time_taken_seconds() },
        })
    }

    pub(crate) fn complete_submission(&mut self) {
        if self.phase == Phase::Submitting {
            self.phase = Phase::Terminated;
        }
    }

    /// Reopens the session so the user can retry; the countdown resumes from where it latched.
    pub(crate) fn fail_submission(&mut self) {
        if self.phase == Phase::Submitting {
            self.phase = Phase::Active;
        }
    }

    pub(crate) fn abandon(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Active {
            return Err(SessionError::NavigationConflict { phase: self.phase });
        }
        self.phase = Phase::Terminated;
        Ok(())
    }
}
