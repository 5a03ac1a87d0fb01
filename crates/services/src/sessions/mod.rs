mod runner;

// Public API of the session subsystem.
pub use crate::error::SessionRunnerError;
pub use runner::{SessionControl, SessionHandle, SessionOutcome, SessionRunner};
