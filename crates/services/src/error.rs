//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;

/// Errors emitted by `DebriefService` requests.
///
/// Callers of `summarize` and `coach_reply` never see these; they are mapped
/// to fallback text at the service boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DebriefError {
    #[error("debrief generation is not configured")]
    Disabled,
    #[error("debrief generation returned an empty response")]
    EmptyResponse,
    #[error("debrief request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the session runner.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionRunnerError {
    #[error("session is no longer running")]
    Stopped,
    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors emitted while opening a history store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
