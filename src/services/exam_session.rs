mod context;
mod controller;
mod errors;
mod guard;
mod state;


pub use context::SessionContext;
pub use controller::{ExamSessionController, SessionCallbacks, SessionView, Termination};
pub use errors::SessionError;
pub use guard::{
    ExitChoice, LeaveAttempt, LeaveVerdict, NavigationGuard, UnloadVerdict, UNLOAD_WARNING,
};
