use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ExamId, ExamInfo, Question, QuestionId};

const DEFAULT_EXAM_NAME: &str = "Exam";

/// Body of `GET /results/exam/{id}/start`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExamStartResponse {
    #[validate(nested)]
    pub exam: ExamMetaDto,
    #[validate(length(min = 1, message = "exam has no questions"), nested)]
    pub questions: Vec<QuestionDto>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExamMetaDto {
    pub id: ExamId,
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(rename = "duration", alias = "durationMinutes")]
    #[validate(range(min = 1, max = 1440, message = "duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QuestionDto {
    pub id: QuestionId,
    #[serde(rename = "questionText", alias = "text")]
    #[validate(length(min = 1, message = "question text must not be empty"))]
    pub question_text: String,
    #[serde(rename = "optionA")]
    pub option_a: String,
    #[serde(rename = "optionB")]
    pub option_b: String,
    #[serde(rename = "optionC")]
    pub option_c: String,
    #[serde(rename = "optionD")]
    pub option_d: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamContent {
    pub exam: ExamInfo,
    pub questions: Vec<Question>,
}

impl ExamStartResponse {
    /// Validates the payload and converts it into session content, keeping question order.
    pub fn into_content(self) -> Result<ExamContent, String> {
        self.validate().map_err(|err| err.to_string())?;

        let mut seen = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            if !seen.insert(question.id) {
                return Err(format!("duplicate question id {}", question.id));
            }
        }

        let name = self
            .exam
            .name
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_EXAM_NAME.to_string());

        let exam = ExamInfo {
            id: self.exam.id,
            name,
            duration_seconds: self.exam.duration_minutes * 60,
        };

        let questions = self
            .questions
            .into_iter()
            .map(|question| Question {
                id: question.id,
                text: question.question_text,
                options: [question.option_a, question.option_b, question.option_c, question.option_d],
            })
            .collect();

        Ok(ExamContent { exam, questions })
    }
}
