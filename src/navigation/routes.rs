use crate::models::ExamId;

pub const LOGIN: &str = "/login";

pub const STUDENT_HOME: &str = "/student";
pub const STUDENT_EXAMS: &str = "/student/exams";
pub const STUDENT_RESULTS: &str = "/student/results";
pub const STUDENT_PIPELINES: &str = "/student/pipelines";

pub const ADMIN_HOME: &str = "/admin";
pub const ADMIN_USERS: &str = "/admin/users";
pub const ADMIN_EXAMS: &str = "/admin/exams";
pub const ADMIN_RESULTS: &str = "/admin/results";

const EXAM_PREFIX: &str = "/student/exam/";

pub fn exam_route(exam_id: ExamId) -> String {
    format!("{EXAM_PREFIX}{exam_id}")
}

/// The exam id embedded in an exam-taking route, if `path` is one.
pub fn exam_id_from_route(path: &str) -> Option<ExamId> {
    path.strip_prefix(EXAM_PREFIX)?.trim_end_matches('/').parse().ok()
}
