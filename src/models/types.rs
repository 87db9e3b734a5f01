use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            OptionLabel::A => 0,
            OptionLabel::B => 1,
            OptionLabel::C => 2,
            OptionLabel::D => 3,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("option must be one of A, B, C or D (got {0:?})")]
pub struct ParseOptionError(pub String);

impl FromStr for OptionLabel {
    type Err = ParseOptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            _ => Err(ParseOptionError(value.to_string())),
        }
    }
}

/// Lifecycle stage of one exam attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Active,
    Submitting,
    Terminated,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Active => "active",
            Phase::Submitting => "submitting",
            Phase::Terminated => "terminated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Answered,
    Unanswered,
}

/// Which terminal submission is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    /// Every question, unanswered ones included as `null`.
    Full,
    /// Answered questions only; the rest count as unattempted.
    Partial,
}

impl SubmissionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionKind::Full => "full",
            SubmissionKind::Partial => "partial",
        }
    }

    /// Action name used in user-facing messages.
    pub fn action(self) -> &'static str {
        match self {
            SubmissionKind::Full => "submit exam",
            SubmissionKind::Partial => "exit exam",
        }
    }

    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            SubmissionKind::Full => "submit",
            SubmissionKind::Partial => "exit",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            SubmissionKind::Full => "Exam submitted successfully!",
            SubmissionKind::Partial => "Exam exited successfully! Results have been saved.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_label_parses_case_insensitively() {
        assert_eq!("b".parse::<OptionLabel>().expect("label"), OptionLabel::B);
        assert_eq!(" D ".parse::<OptionLabel>().expect("label"), OptionLabel::D);
        assert_eq!("E".parse::<OptionLabel>().unwrap_err(), ParseOptionError("E".to_string()));
        assert!("".parse::<OptionLabel>().is_err());
    }

    #[test]
    fn option_label_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&OptionLabel::C).expect("json"), "\"C\"");
        let parsed: OptionLabel = serde_json::from_str("\"A\"").expect("label");
        assert_eq!(parsed, OptionLabel::A);
    }

    #[test]
    fn submission_kind_maps_to_endpoint_and_action() {
        assert_eq!(SubmissionKind::Full.endpoint(), "submit");
        assert_eq!(SubmissionKind::Partial.endpoint(), "exit");
        assert_eq!(SubmissionKind::Full.action(), "submit exam");
        assert_eq!(SubmissionKind::Partial.action(), "exit exam");
    }
}
