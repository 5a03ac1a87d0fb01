//! Session engine: phase sequencing, rep counting and elapsed time.

mod clock;
mod machine;
mod phase;
mod reps;

pub use clock::SessionClock;
pub use machine::{
    SessionEffect, SessionEvent, SessionSnapshot, SessionState, SessionStateMachine, Transition,
};
pub use phase::SessionPhase;
pub use reps::{RepTracker, RepVerdict};
