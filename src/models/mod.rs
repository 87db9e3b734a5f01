mod exam;
mod types;

pub use exam::{ExamId, ExamInfo, Question, QuestionId};
pub use types::{OptionLabel, ParseOptionError, Phase, QuestionStatus, SubmissionKind};
