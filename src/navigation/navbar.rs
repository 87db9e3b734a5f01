use std::sync::Arc;

use super::{routes, Navigator};
use crate::services::exam_session::{LeaveAttempt, LeaveVerdict, SessionContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

const ADMIN_LINKS: [NavLink; 4] = [
    NavLink { label: "Dashboard", path: routes::ADMIN_HOME },
    NavLink { label: "Users", path: routes::ADMIN_USERS },
    NavLink { label: "Exams", path: routes::ADMIN_EXAMS },
    NavLink { label: "Results", path: routes::ADMIN_RESULTS },
];

const STUDENT_LINKS: [NavLink; 4] = [
    NavLink { label: "Dashboard", path: routes::STUDENT_HOME },
    NavLink { label: "My Exams", path: routes::STUDENT_EXAMS },
    NavLink { label: "My Results", path: routes::STUDENT_RESULTS },
    NavLink { label: "My Order", path: routes::STUDENT_PIPELINES },
];

/// Application-wide navigation bar. Every link goes through the session
/// context so a running exam can intercept it.
#[derive(Clone)]
pub struct Navbar {
    role: Role,
    sessions: SessionContext,
    navigator: Arc<dyn Navigator>,
}

impl Navbar {
    pub fn new(role: Role, sessions: SessionContext, navigator: Arc<dyn Navigator>) -> Self {
        Self { role, sessions, navigator }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn links(&self) -> &'static [NavLink] {
        match self.role {
            Role::Admin => &ADMIN_LINKS,
            Role::Student => &STUDENT_LINKS,
        }
    }

    /// Navigates now, or leaves `path` pending behind the exam's exit prompt.
    pub async fn navigate(&self, path: &str) -> LeaveVerdict {
        let verdict = self.sessions.request_exit(LeaveAttempt::Navigate(path.to_string())).await;
        if verdict == LeaveVerdict::Proceed {
            self.navigator.go_to(path);
        }
        verdict
    }

    pub async fn logout(&self) -> LeaveVerdict {
        tracing::info!(role = self.role.as_str(), "Logout requested");
        self.navigate(routes::LOGIN).await
    }
}
