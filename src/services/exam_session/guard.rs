use async_trait::async_trait;

pub const UNLOAD_WARNING: &str =
    "Are you sure you want to leave? Your exam progress will be lost.";

/// An attempt to leave the exam view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveAttempt {
    /// Browser back button.
    Back,
    /// The in-exam "Exit Exam" button.
    ExitButton,
    /// Navigation requested elsewhere in the application, e.g. a navbar link.
    Navigate(String),
}

impl LeaveAttempt {
    pub fn as_str(&self) -> &str {
        match self {
            LeaveAttempt::Back => "back",
            LeaveAttempt::ExitButton => "exit_button",
            LeaveAttempt::Navigate(_) => "navigate",
        }
    }

    pub(crate) fn destination(&self) -> Option<&str> {
        match self {
            LeaveAttempt::Navigate(path) => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveVerdict {
    Proceed,
    /// The exit prompt is showing; the caller must not navigate.
    Intercepted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnloadVerdict {
    Proceed,
    /// Show the native warning. Leaving anyway submits nothing.
    Warn(&'static str),
}

/// The three answers the exit prompt offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitChoice {
    Continue,
    GoBack,
    ExitAndSubmit,
}

impl ExitChoice {
    pub const ALL: [ExitChoice; 3] =
        [ExitChoice::Continue, ExitChoice::GoBack, ExitChoice::ExitAndSubmit];

    pub fn label(self) -> &'static str {
        match self {
            ExitChoice::Continue => "Continue Exam",
            ExitChoice::GoBack => "Go Back",
            ExitChoice::ExitAndSubmit => "Exit & Submit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitChoice::Continue => "Stay on this page and continue",
            ExitChoice::GoBack => "Leave without saving (lose all progress)",
            ExitChoice::ExitAndSubmit => "Save current answers and submit exam",
        }
    }
}

/// Hooks the environment calls before leaving the exam view.
#[async_trait]
pub trait NavigationGuard: Send + Sync {
    async fn on_leave_attempt(&self, attempt: LeaveAttempt) -> LeaveVerdict;

    async fn on_unload(&self) -> UnloadVerdict;
}
