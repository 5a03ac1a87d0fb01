#![forbid(unsafe_code)]

pub mod deck;
pub mod error;
pub mod model;
pub mod session;
pub mod stats;
pub mod time;

pub use deck::{DECK_SIZE, Deck, build_deck};
pub use error::Error;
pub use session::{SessionEffect, SessionEvent, SessionPhase, SessionState, SessionStateMachine};
pub use time::Clock;
