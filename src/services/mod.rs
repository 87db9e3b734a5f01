pub mod exam_session;
pub mod results_api;
