#![forbid(unsafe_code)]

pub mod collaborators;
pub mod config;
pub mod debrief_service;
pub mod error;
pub mod history_service;
pub mod sessions;

pub use workout_core::Clock;

pub use collaborators::{Announcer, SessionCues, Silent, announcement_text};
pub use config::SessionConfig;
pub use debrief_service::{Debrief, DebriefConfig, DebriefService, debrief_prompt};
pub use error::{DebriefError, HistoryError, SessionRunnerError};
pub use history_service::{HistoryService, HistoryStore, HistoryTotals};
pub use sessions::{SessionControl, SessionHandle, SessionOutcome, SessionRunner};
