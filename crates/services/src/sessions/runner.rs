use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use workout_core::model::WorkoutStats;
use workout_core::session::{
    SessionEffect, SessionEvent, SessionPhase, SessionSnapshot, SessionStateMachine,
};

use crate::collaborators::{Announcer, SessionCues, Silent};
use crate::config::SessionConfig;
use crate::error::SessionRunnerError;
use crate::history_service::HistoryService;
use crate::Clock;

/// How a session task ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Deck exhausted; the stats were handed to history.
    Completed(WorkoutStats),
    /// User left early. Nothing was saved.
    Abandoned,
}

/// Drives one `SessionStateMachine` on a tokio task.
///
/// All events, whether from the user, the ticker or the presentation
/// and auto-advance timers, are funneled through a single loop, so the
/// state machine sees them strictly one at a time.
#[derive(Clone)]
pub struct SessionRunner {
    config: SessionConfig,
    clock: Clock,
    announcer: Arc<dyn Announcer>,
    cues: Arc<dyn SessionCues>,
    history: HistoryService,
}

impl SessionRunner {
    #[must_use]
    pub fn new(history: HistoryService) -> Self {
        Self {
            config: SessionConfig::default(),
            clock: Clock::default(),
            announcer: Arc::new(Silent),
            cues: Arc::new(Silent),
            history,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Clock used to date sessions created by [`SessionRunner::start_new`].
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = announcer;
        self
    }

    #[must_use]
    pub fn with_cues(mut self, cues: Arc<dyn SessionCues>) -> Self {
        self.cues = cues;
        self
    }

    /// Spawn a session over a freshly shuffled deck.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start_new(&self) -> SessionHandle {
        self.start(SessionStateMachine::new().with_clock(self.clock))
    }

    /// Spawn a session task for `machine`. The session stays in PREP until
    /// [`SessionControl::start`] is called.
    #[must_use]
    pub fn start(&self, machine: SessionStateMachine) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.state().snapshot());

        tracing::info!(cards = machine.state().deck().len(), "session ready");

        let actor = SessionActor {
            machine,
            config: self.config.clone(),
            announcer: Arc::clone(&self.announcer),
            cues: Arc::clone(&self.cues),
            history: self.history.clone(),
            events: events_rx,
            timer_tx,
            timer_rx,
            snapshots: snapshot_tx,
            timers: Vec::new(),
        };

        SessionHandle {
            control: SessionControl {
                events: events_tx,
                snapshots: snapshot_rx,
            },
            task: tokio::spawn(actor.run()),
        }
    }
}

/// Cloneable remote for a running session.
#[derive(Clone)]
pub struct SessionControl {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionControl {
    /// Queue an arbitrary event.
    ///
    /// # Errors
    ///
    /// Returns `SessionRunnerError::Stopped` once the session task has ended.
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionRunnerError> {
        self.events
            .send(event)
            .map_err(|_| SessionRunnerError::Stopped)
    }

    /// # Errors
    ///
    /// Returns `SessionRunnerError::Stopped` once the session task has ended.
    pub fn start(&self) -> Result<(), SessionRunnerError> {
        self.send(SessionEvent::Start)
    }

    /// Report one repetition from the rep source.
    ///
    /// # Errors
    ///
    /// Returns `SessionRunnerError::Stopped` once the session task has ended.
    pub fn rep_observed(&self, confidence: Option<f64>) -> Result<(), SessionRunnerError> {
        self.send(SessionEvent::RepObserved { confidence })
    }

    /// # Errors
    ///
    /// Returns `SessionRunnerError::Stopped` once the session task has ended.
    pub fn draw_next(&self) -> Result<(), SessionRunnerError> {
        self.send(SessionEvent::DrawNext)
    }

    /// # Errors
    ///
    /// Returns `SessionRunnerError::Stopped` once the session task has ended.
    pub fn abandon(&self) -> Result<(), SessionRunnerError> {
        self.send(SessionEvent::Abandon)
    }

    /// State as of the last committed transition.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every committed transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

/// Owner's handle: a control plus the task to await.
pub struct SessionHandle {
    control: SessionControl,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    #[must_use]
    pub fn control(&self) -> &SessionControl {
        &self.control
    }

    /// Wait for the session task to end. The handle's own control stays
    /// alive until then, so the session is not abandoned by this call.
    ///
    /// # Errors
    ///
    /// Returns `SessionRunnerError::Task` if the task panicked or was cancelled.
    pub async fn finished(self) -> Result<SessionOutcome, SessionRunnerError> {
        let outcome = self.task.await?;
        Ok(outcome)
    }
}

struct SessionActor {
    machine: SessionStateMachine,
    config: SessionConfig,
    announcer: Arc<dyn Announcer>,
    cues: Arc<dyn SessionCues>,
    history: HistoryService,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    timer_tx: mpsc::UnboundedSender<SessionEvent>,
    timer_rx: mpsc::UnboundedReceiver<SessionEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
    timers: Vec<JoinHandle<()>>,
}

impl SessionActor {
    async fn run(mut self) -> SessionOutcome {
        let period = self.config.tick_interval();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                biased;
                // Every control dropped: nobody can finish the session any more.
                external = self.events.recv() => external.unwrap_or(SessionEvent::Abandon),
                Some(internal) = self.timer_rx.recv() => internal,
                _ = ticker.tick() => SessionEvent::Tick,
            };

            if event == SessionEvent::Tick {
                tracing::trace!(phase = %self.machine.phase(), "tick");
            } else {
                tracing::debug!(?event, phase = %self.machine.phase(), "session event");
            }

            let was_prep = self.machine.phase() == SessionPhase::Prep;
            let effects = self.machine.dispatch(event);
            if was_prep && self.machine.phase().clock_running() {
                // First counted second starts at the Start transition.
                ticker.reset();
            }
            self.snapshots.send_replace(self.machine.state().snapshot());

            if let Some(outcome) = self.apply(effects).await {
                for timer in self.timers.drain(..) {
                    timer.abort();
                }
                return outcome;
            }
        }
    }

    async fn apply(&mut self, effects: Vec<SessionEffect>) -> Option<SessionOutcome> {
        for effect in effects {
            match effect {
                SessionEffect::PresentCard { index, card } => {
                    self.cues.card_drawn(index, &card);
                    self.schedule(
                        self.config.presentation_delay(),
                        SessionEvent::CardPresented { index },
                    );
                }
                SessionEffect::Announce {
                    target_reps,
                    exercise,
                } => self.announcer.announce(target_reps, exercise),
                SessionEffect::RepCounted { reps, target } => self.cues.rep_counted(reps, target),
                SessionEffect::CardCompleted { index, card } => {
                    self.cues.card_completed(&card);
                    if let Some(after) = self.config.auto_advance_after() {
                        self.schedule(after, SessionEvent::AutoAdvance { index });
                    }
                }
                SessionEffect::Finished(stats) => {
                    tracing::info!(
                        workout = %stats.id(),
                        total_reps = stats.total_reps(),
                        duration_secs = stats.duration_secs(),
                        "session finished"
                    );
                    self.history.save(&stats).await;
                    return Some(SessionOutcome::Completed(stats));
                }
                SessionEffect::Abandoned => {
                    tracing::info!("session abandoned");
                    return Some(SessionOutcome::Abandoned);
                }
            }
        }
        None
    }

    fn schedule(&mut self, after: Duration, event: SessionEvent) {
        self.timers.retain(|timer| !timer.is_finished());
        let tx = self.timer_tx.clone();
        self.timers.push(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver is gone once the session has ended.
            let _ = tx.send(event);
        }));
    }
}
