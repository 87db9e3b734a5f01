use std::sync::{Mutex, PoisonError};

/// Navigation primitive of the surrounding application.
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);

    fn go_back(&self);

    fn current(&self) -> String;
}

/// In-memory browser-style history. The first entry is never popped.
#[derive(Debug)]
pub struct RouteHistory {
    entries: Mutex<Vec<String>>,
}

impl RouteHistory {
    pub fn new(start: impl Into<String>) -> Self {
        Self { entries: Mutex::new(vec![start.into()]) }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for RouteHistory {
    fn go_to(&self, path: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = entries.last().map(String::as_str).unwrap_or(""), to = path, "Navigate");
        entries.push(path.to_string());
    }

    fn go_back(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() > 1 {
            entries.pop();
        }
        tracing::debug!(to = entries.last().map(String::as_str).unwrap_or(""), "Navigate back");
    }

    fn current(&self) -> String {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.last().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_returns_to_previous_entry_but_keeps_root() {
        let history = RouteHistory::new("/student/exams");
        history.go_to("/student/exam/3");
        assert_eq!(history.current(), "/student/exam/3");

        history.go_back();
        assert_eq!(history.current(), "/student/exams");
        history.go_back();
        assert_eq!(history.current(), "/student/exams");
        assert_eq!(history.entries(), vec!["/student/exams".to_string()]);
    }
}
