use super::SessionPhase;

/// Elapsed-seconds counter for one session.
///
/// Only moves forward, and only while the phase is between PREP and FINISHED.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionClock {
    elapsed_seconds: u64,
}

impl SessionClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Counts one second if `phase` keeps the clock running. Returns whether it counted.
    pub fn tick(&mut self, phase: SessionPhase) -> bool {
        if !phase.clock_running() {
            return false;
        }
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_in_prep_and_finished() {
        let mut clock = SessionClock::new();
        assert!(!clock.tick(SessionPhase::Prep));
        assert!(!clock.tick(SessionPhase::Finished));
        assert_eq!(clock.elapsed_seconds(), 0);
    }

    #[test]
    fn counts_in_active_phases() {
        let mut clock = SessionClock::new();
        for phase in [
            SessionPhase::Drawing,
            SessionPhase::Exercising,
            SessionPhase::Rest,
        ] {
            assert!(clock.tick(phase));
        }
        assert_eq!(clock.elapsed_seconds(), 3);
    }
}
