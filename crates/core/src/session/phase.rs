use std::fmt;

/// Stage of a session's life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Deck is built, waiting for the user to start.
    Prep,
    /// A card is being shown before the set begins.
    Drawing,
    /// The set for the current card is in progress.
    Exercising,
    /// Current card is done; waiting for draw-next.
    Rest,
    /// Terminal. The deck is exhausted and stats were produced.
    Finished,
}

impl SessionPhase {
    /// Whether the session clock counts seconds in this phase.
    #[must_use]
    pub fn clock_running(self) -> bool {
        !matches!(self, SessionPhase::Prep | SessionPhase::Finished)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Prep => "PREP",
            SessionPhase::Drawing => "DRAWING",
            SessionPhase::Exercising => "EXERCISING",
            SessionPhase::Rest => "REST",
            SessionPhase::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
