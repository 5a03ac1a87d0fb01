use super::SessionPhase;

/// Outcome of feeding one rep-observed signal to a [`RepTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepVerdict {
    /// The rep was counted.
    pub accepted: bool,
    /// This rep brought the count to the target. Fires once per card.
    pub card_complete: bool,
}

impl RepVerdict {
    const REJECTED: Self = Self {
        accepted: false,
        card_complete: false,
    };
}

/// Rep counter for the active card.
///
/// The count never passes the target, so a duplicate or late signal after
/// completion is rejected and cannot complete the card a second time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepTracker {
    reps: u32,
    target: u32,
}

impl RepTracker {
    /// Fresh counter at zero for a card with the given rep target.
    #[must_use]
    pub fn for_target(target: u32) -> Self {
        Self { reps: 0, target }
    }

    #[must_use]
    pub fn reps(&self) -> u32 {
        self.reps
    }

    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.reps >= self.target
    }

    /// Applies one rep-observed signal.
    ///
    /// Accepted only while `phase` is EXERCISING and the count is below target.
    pub fn observe(&mut self, phase: SessionPhase) -> RepVerdict {
        if phase != SessionPhase::Exercising || self.is_complete() {
            return RepVerdict::REJECTED;
        }
        self.reps += 1;
        RepVerdict {
            accepted: true,
            card_complete: self.reps == self.target,
        }
    }
}
