use std::fmt::Write as _;

use crate::core::time::{format_countdown, format_elapsed};
use crate::models::{OptionLabel, Question};
use crate::schemas::submission::SubmissionReceipt;
use crate::services::exam_session::{ExitChoice, SessionView};

/// Remaining-time marks that get a warning line.
pub(crate) const WARNING_MARKS: [u32; 3] = [60, 30, 10];

pub(crate) fn status_line(view: &SessionView) -> String {
    format!(
        "{} | {} left | {}/{} answered ({}%)",
        view.exam_name,
        format_countdown(view.remaining_seconds),
        view.answered,
        view.total,
        view.progress_percent()
    )
}

pub(crate) fn question(number: usize, question: &Question, answer: Option<OptionLabel>) -> String {
    let marker = if answer.is_some() { "answered" } else { "unanswered" };
    let mut out = format!("Question {number} [{marker}]\n  {}\n", question.text);
    for label in OptionLabel::ALL {
        let selected = if answer == Some(label) { '*' } else { ' ' };
        let _ = writeln!(out, " {selected}{label}. {}", question.option(label));
    }
    out
}

pub(crate) fn exit_prompt() -> String {
    let mut out = String::from("You are currently taking an exam. What would you like to do?\n");
    for (choice, command) in ExitChoice::ALL.iter().zip(["continue", "goback", "exitsubmit"]) {
        let _ = writeln!(out, "  {command:<10} {}: {}", choice.label(), choice.description());
    }
    out
}

pub(crate) fn time_warning(remaining_seconds: u32) -> Option<String> {
    WARNING_MARKS
        .contains(&remaining_seconds)
        .then(|| format!("Warning: {} remaining", format_elapsed(remaining_seconds)))
}

pub(crate) fn receipt(receipt: &SubmissionReceipt) -> String {
    let mut out = format!(
        "{} Time taken: {}, answered: {}.",
        receipt.kind.success_message(),
        format_elapsed(receipt.time_taken_seconds),
        receipt.answered
    );
    if let Some(message) = &receipt.server_message {
        let _ = write!(out, " Server: {message}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, SubmissionKind};
    use crate::test_support::exam_content;

    #[test]
    fn status_line_shows_countdown_and_progress() {
        let view = SessionView {
            exam_name: "Risk".to_string(),
            phase: Phase::Active,
            remaining_seconds: 307,
            answered: 1,
            total: 4,
            progress: 0.25,
            prompt_open: false,
            last_error: None,
        };
        assert_eq!(status_line(&view), "Risk | 05:07 left | 1/4 answered (25%)");
    }

    #[test]
    fn question_marks_selected_option() {
        let content = exam_content(1, 1, 10);
        let rendered = question(1, &content.questions[0], Some(OptionLabel::B));

        assert!(rendered.starts_with("Question 1 [answered]"));
        assert!(rendered.contains(" *B. Option B1"));
        assert!(rendered.contains("  A. Option A1"));
    }

    #[test]
    fn warnings_fire_only_on_marks() {
        assert_eq!(time_warning(60).as_deref(), Some("Warning: 1m 0s remaining"));
        assert_eq!(time_warning(10).as_deref(), Some("Warning: 10s remaining"));
        assert_eq!(time_warning(59), None);
    }

    #[test]
    fn receipt_uses_portal_wording() {
        let text = receipt(&SubmissionReceipt {
            kind: SubmissionKind::Partial,
            time_taken_seconds: 40,
            answered: 1,
            server_message: None,
        });
        assert_eq!(
            text,
            "Exam exited successfully! Results have been saved. Time taken: 40s, answered: 1."
        );
    }

    #[test]
    fn prompt_lists_three_choices() {
        let prompt = exit_prompt();
        assert!(prompt.contains("Continue Exam"));
        assert!(prompt.contains("Go Back"));
        assert!(prompt.contains("Exit & Submit"));
    }
}
