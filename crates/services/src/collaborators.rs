//! Outward-facing hooks the session runner calls after each committed transition.

use workout_core::model::{Card, Exercise};

/// Voice channel for "10 Push-Ups" style announcements.
///
/// Called from the session task; implementations must return promptly.
pub trait Announcer: Send + Sync {
    fn announce(&self, target_reps: u32, exercise: Exercise);
}

/// Display and haptic cues. Every hook defaults to doing nothing.
pub trait SessionCues: Send + Sync {
    fn card_drawn(&self, _index: usize, _card: &Card) {}

    fn rep_counted(&self, _reps: u32, _target: u32) {}

    fn card_completed(&self, _card: &Card) {}
}

/// Collaborator that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Announcer for Silent {
    fn announce(&self, _target_reps: u32, _exercise: Exercise) {}
}

impl SessionCues for Silent {}

/// Text spoken when a set begins.
#[must_use]
pub fn announcement_text(target_reps: u32, exercise: Exercise) -> String {
    format!("{target_reps} {exercise}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announcement_reads_target_then_exercise() {
        assert_eq!(announcement_text(15, Exercise::Burpees), "15 Burpees");
        assert_eq!(announcement_text(2, Exercise::PushUps), "2 Push-Ups");
    }
}
