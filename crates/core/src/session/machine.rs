use crate::deck::{Deck, build_deck};
use crate::model::{Card, Exercise, WorkoutStats};
use crate::stats::aggregate_with_form_samples;
use crate::time::Clock;

use super::{RepTracker, SessionClock, SessionPhase};

//
// ─── EVENTS & EFFECTS ──────────────────────────────────────────────────────────
//

/// Input delivered to the session. The engine does not care what produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Leave PREP and draw the first card.
    Start,
    /// The presentation pause for the card at `index` has elapsed.
    CardPresented { index: usize },
    /// The rep source saw one repetition, optionally with a confidence in `0.0..=1.0`.
    RepObserved { confidence: Option<f64> },
    /// User asked for the next card.
    DrawNext,
    /// Auto-advance timer for the rest after the card at `index` fired.
    AutoAdvance { index: usize },
    /// One second of wall-clock time passed.
    Tick,
    /// User left mid-session. No stats are produced.
    Abandon,
}

/// Side effect requested by a committed transition, executed by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// Show `card`; deliver `CardPresented { index }` after the presentation pause.
    PresentCard { index: usize, card: Card },
    /// Speak the target, e.g. "10 Push-Ups".
    Announce { target_reps: u32, exercise: Exercise },
    /// Short cue for a counted rep.
    RepCounted { reps: u32, target: u32 },
    /// Completion cue; the session is now resting after the card at `index`.
    CardCompleted { index: usize, card: Card },
    /// Session reached FINISHED. Emitted once per session.
    Finished(WorkoutStats),
    /// Session was abandoned and will ignore further events.
    Abandoned,
}

/// Result of applying one event: the next state plus the effects to run after committing it.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub effects: Vec<SessionEffect>,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Read-only view for HUDs and progress output.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_index: Option<usize>,
    pub current_card: Option<Card>,
    pub deck_len: usize,
    pub current_reps: u32,
    pub target_reps: u32,
    pub elapsed_seconds: u64,
    pub cards_completed: usize,
    pub abandoned: bool,
}

/// Everything that changes during a session.
///
/// The only way to move forward is [`SessionState::transition`], which
/// returns a new state and leaves `self` untouched.
#[derive(Debug, Clone)]
pub struct SessionState {
    deck: Deck,
    current_index: Option<usize>,
    phase: SessionPhase,
    reps: RepTracker,
    clock: SessionClock,
    completed_cards: Vec<Card>,
    form_samples: Vec<f64>,
    abandoned: bool,
}

impl SessionState {
    /// Session in PREP over `deck`, before the first card.
    #[must_use]
    pub fn new(deck: Deck) -> Self {
        Self {
            deck,
            current_index: None,
            phase: SessionPhase::Prep,
            reps: RepTracker::default(),
            clock: SessionClock::new(),
            completed_cards: Vec::new(),
            form_samples: Vec::new(),
            abandoned: false,
        }
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Index of the card in play; `None` until the first draw.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&Card> {
        self.current_index.and_then(|i| self.deck.get(i))
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn current_reps(&self) -> u32 {
        self.reps.reps()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.elapsed_seconds()
    }

    #[must_use]
    pub fn completed_cards(&self) -> &[Card] {
        &self.completed_cards
    }

    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// FINISHED or abandoned; every later event is a no-op.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.abandoned || self.phase == SessionPhase::Finished
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_index: self.current_index,
            current_card: self.current_card().cloned(),
            deck_len: self.deck.len(),
            current_reps: self.reps.reps(),
            target_reps: self.reps.target(),
            elapsed_seconds: self.clock.elapsed_seconds(),
            cards_completed: self.completed_cards.len(),
            abandoned: self.abandoned,
        }
    }

    /// Applies `event` and returns the next state with its effects.
    ///
    /// `clock` stamps the date on the stats produced at FINISHED.
    /// Events that do not apply to the current phase leave the state as is and
    /// produce no effects.
    #[must_use]
    pub fn transition(&self, event: SessionEvent, clock: &Clock) -> Transition {
        let mut next = self.clone();
        let mut effects = Vec::new();

        if next.is_terminal() {
            return Transition {
                state: next,
                effects,
            };
        }

        match event {
            SessionEvent::Start => {
                if next.phase == SessionPhase::Prep {
                    next.draw_next(clock, &mut effects);
                }
            }
            SessionEvent::CardPresented { index } => {
                if next.phase == SessionPhase::Drawing && next.current_index == Some(index) {
                    next.begin_set(&mut effects);
                }
            }
            SessionEvent::RepObserved { confidence } => {
                next.observe_rep(confidence, &mut effects);
            }
            SessionEvent::DrawNext => {
                if next.phase == SessionPhase::Rest {
                    next.draw_next(clock, &mut effects);
                }
            }
            SessionEvent::AutoAdvance { index } => {
                if next.phase == SessionPhase::Rest && next.current_index == Some(index) {
                    next.draw_next(clock, &mut effects);
                }
            }
            SessionEvent::Tick => {
                next.clock.tick(next.phase);
            }
            SessionEvent::Abandon => {
                next.abandoned = true;
                next.reps = RepTracker::default();
                next.form_samples.clear();
                effects.push(SessionEffect::Abandoned);
            }
        }

        Transition {
            state: next,
            effects,
        }
    }

    fn draw_next(&mut self, clock: &Clock, effects: &mut Vec<SessionEffect>) {
        let index = self.current_index.map_or(0, |i| i + 1);
        let Some(card) = self.deck.get(index).cloned() else {
            self.finish(clock, effects);
            return;
        };

        self.phase = SessionPhase::Drawing;
        self.current_index = Some(index);
        self.reps = RepTracker::for_target(card.value());
        effects.push(SessionEffect::PresentCard { index, card });
    }

    fn begin_set(&mut self, effects: &mut Vec<SessionEffect>) {
        let Some(card) = self.current_card() else {
            return;
        };
        let (target_reps, exercise) = (card.value(), card.exercise());

        self.phase = SessionPhase::Exercising;
        self.reps = RepTracker::for_target(target_reps);
        effects.push(SessionEffect::Announce {
            target_reps,
            exercise,
        });
    }

    fn observe_rep(&mut self, confidence: Option<f64>, effects: &mut Vec<SessionEffect>) {
        let verdict = self.reps.observe(self.phase);
        if !verdict.accepted {
            return;
        }

        if let Some(c) = confidence.filter(|c| c.is_finite()) {
            self.form_samples.push(c.clamp(0.0, 1.0));
        }
        effects.push(SessionEffect::RepCounted {
            reps: self.reps.reps(),
            target: self.reps.target(),
        });

        if verdict.card_complete {
            let (Some(index), Some(card)) = (self.current_index, self.current_card().cloned())
            else {
                return;
            };
            self.phase = SessionPhase::Rest;
            self.completed_cards.push(card.clone());
            effects.push(SessionEffect::CardCompleted { index, card });
        }
    }

    fn finish(&mut self, clock: &Clock, effects: &mut Vec<SessionEffect>) {
        self.phase = SessionPhase::Finished;
        let stats = aggregate_with_form_samples(
            &self.completed_cards,
            self.clock.elapsed_seconds(),
            &self.form_samples,
            clock.now(),
        );
        effects.push(SessionEffect::Finished(stats));
    }
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Owns the single `SessionState` of a session and feeds it events in order.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    state: SessionState,
    clock: Clock,
}

impl SessionStateMachine {
    /// New session in PREP over a freshly shuffled deck.
    #[must_use]
    pub fn new() -> Self {
        Self::with_deck(build_deck())
    }

    #[must_use]
    pub fn with_deck(deck: Deck) -> Self {
        Self {
            state: SessionState::new(deck),
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Commits the transition for `event` and hands back its effects.
    pub fn dispatch(&mut self, event: SessionEvent) -> Vec<SessionEffect> {
        let Transition { state, effects } = self.state.transition(event, &self.clock);
        self.state = state;
        effects
    }
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
