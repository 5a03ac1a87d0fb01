use std::time::Duration;

/// Pause between drawing a card and starting its set.
pub const DEFAULT_PRESENTATION_DELAY: Duration = Duration::from_millis(1_000);

/// Session clock resolution.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Timing knobs for a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    presentation_delay: Duration,
    tick_interval: Duration,
    auto_advance_after: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            presentation_delay: DEFAULT_PRESENTATION_DELAY,
            tick_interval: DEFAULT_TICK_INTERVAL,
            auto_advance_after: None,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_presentation_delay(mut self, delay: Duration) -> Self {
        self.presentation_delay = delay;
        self
    }

    /// Overrides the tick period. Zero is ignored.
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.tick_interval = interval;
        }
        self
    }

    /// Draw the next card automatically this long after a card is cleared.
    /// `None` waits for an explicit draw-next.
    #[must_use]
    pub fn with_auto_advance(mut self, after: Option<Duration>) -> Self {
        self.auto_advance_after = after;
        self
    }

    #[must_use]
    pub fn presentation_delay(&self) -> Duration {
        self.presentation_delay
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn auto_advance_after(&self) -> Option<Duration> {
        self.auto_advance_after
    }
}
