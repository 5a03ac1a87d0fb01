use std::sync::{Arc, Mutex};
use std::time::Duration;

use services::{
    Announcer, Clock, HistoryService, SessionConfig, SessionControl, SessionCues, SessionOutcome,
    SessionRunner,
};
use tokio::sync::watch;
use workout_core::deck::{DECK_SIZE, Deck};
use workout_core::model::{Card, Exercise};
use workout_core::session::{SessionPhase, SessionSnapshot, SessionStateMachine};
use workout_core::time::fixed_now;

#[derive(Default)]
struct Recorder {
    announced: Mutex<Vec<(u32, Exercise)>>,
    drawn: Mutex<Vec<usize>>,
    completed: Mutex<Vec<String>>,
}

impl Announcer for Recorder {
    fn announce(&self, target_reps: u32, exercise: Exercise) {
        self.announced.lock().unwrap().push((target_reps, exercise));
    }
}

impl SessionCues for Recorder {
    fn card_drawn(&self, index: usize, _card: &Card) {
        self.drawn.lock().unwrap().push(index);
    }

    fn card_completed(&self, card: &Card) {
        self.completed.lock().unwrap().push(card.label());
    }
}

fn short_deck(n: usize) -> Deck {
    Deck::from_cards(Deck::canonical().as_slice()[..n].to_vec())
}

fn auto_advancing() -> SessionConfig {
    SessionConfig::default().with_auto_advance(Some(Duration::from_millis(500)))
}

async fn wait_for(
    updates: &mut watch::Receiver<SessionSnapshot>,
    pred: impl Fn(&SessionSnapshot) -> bool,
) -> SessionSnapshot {
    updates
        .wait_for(|s| pred(s))
        .await
        .expect("session ended before the expected state")
        .clone()
}

async fn clear_every_card(control: &SessionControl, cards: usize) {
    let mut updates = control.subscribe();
    for index in 0..cards {
        let snap = wait_for(&mut updates, |s| {
            s.phase == SessionPhase::Exercising && s.current_index == Some(index)
        })
        .await;
        for _ in 0..snap.target_reps {
            control.rep_observed(None).unwrap();
        }
    }
}

#[tokio::test(start_paused = true)]
async fn completed_session_is_saved_and_announced() {
    let history = HistoryService::in_memory();
    let recorder = Arc::new(Recorder::default());
    let runner = SessionRunner::new(history.clone())
        .with_config(auto_advancing())
        .with_announcer(recorder.clone())
        .with_cues(recorder.clone());

    let machine = SessionStateMachine::with_deck(short_deck(2)).with_clock(Clock::fixed(fixed_now()));
    let handle = runner.start(machine);
    handle.control().start().unwrap();
    clear_every_card(handle.control(), 2).await;

    let SessionOutcome::Completed(stats) = handle.finished().await.unwrap() else {
        panic!("session should complete");
    };
    assert_eq!(stats.total_reps(), 5);
    assert_eq!(stats.reps_by_exercise().get(Exercise::PushUps), 5);
    assert_eq!(stats.cards_completed(), 2);
    assert!(stats.duration_secs() >= 2);
    assert_eq!(stats.date(), fixed_now());

    assert_eq!(history.load_history().await, vec![stats]);
    assert_eq!(
        *recorder.announced.lock().unwrap(),
        vec![(2, Exercise::PushUps), (3, Exercise::PushUps)]
    );
    assert_eq!(*recorder.drawn.lock().unwrap(), vec![0, 1]);
    assert_eq!(*recorder.completed.lock().unwrap(), vec!["2♥", "3♥"]);
}

#[tokio::test(start_paused = true)]
async fn full_deck_totals_every_card() {
    let history = HistoryService::in_memory();
    let runner = SessionRunner::new(history.clone()).with_config(auto_advancing());

    let handle = runner.start_new();
    handle.control().start().unwrap();
    clear_every_card(handle.control(), DECK_SIZE).await;

    let SessionOutcome::Completed(stats) = handle.finished().await.unwrap() else {
        panic!("session should complete");
    };
    assert_eq!(stats.total_reps(), 420);
    assert_eq!(stats.cards_completed(), 52);
    for exercise in Exercise::ALL {
        assert_eq!(stats.reps_by_exercise().get(exercise), 105);
    }
    assert_eq!(history.load_history().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoned_session_saves_nothing() {
    let history = HistoryService::in_memory();
    let runner = SessionRunner::new(history.clone());

    let handle = runner.start(SessionStateMachine::with_deck(short_deck(3)));
    let control = handle.control().clone();
    control.start().unwrap();

    let mut updates = control.subscribe();
    wait_for(&mut updates, |s| s.phase == SessionPhase::Exercising).await;
    control.rep_observed(Some(0.9)).unwrap();
    control.abandon().unwrap();

    assert_eq!(handle.finished().await.unwrap(), SessionOutcome::Abandoned);
    assert!(history.load_history().await.is_empty());
    assert!(control.start().is_err());
    assert!(control.snapshot().abandoned);
}

#[tokio::test(start_paused = true)]
async fn double_draw_next_skips_no_card() {
    let runner = SessionRunner::new(HistoryService::in_memory());
    let handle = runner.start(SessionStateMachine::with_deck(short_deck(3)));
    let control = handle.control().clone();
    let mut updates = control.subscribe();

    control.start().unwrap();
    let first = wait_for(&mut updates, |s| s.phase == SessionPhase::Exercising).await;
    for _ in 0..first.target_reps {
        control.rep_observed(None).unwrap();
    }
    wait_for(&mut updates, |s| s.phase == SessionPhase::Rest).await;

    control.draw_next().unwrap();
    control.draw_next().unwrap();
    let second = wait_for(&mut updates, |s| s.phase == SessionPhase::Exercising).await;
    assert_eq!(second.current_index, Some(1));

    control.abandon().unwrap();
    assert_eq!(handle.finished().await.unwrap(), SessionOutcome::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn clock_waits_in_prep() {
    let runner = SessionRunner::new(HistoryService::in_memory());
    let handle = runner.start(SessionStateMachine::with_deck(short_deck(1)));

    tokio::time::sleep(Duration::from_secs(5)).await;
    let snap = handle.control().snapshot();
    assert_eq!(snap.phase, SessionPhase::Prep);
    assert_eq!(snap.elapsed_seconds, 0);

    handle.control().start().unwrap();
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert!(handle.control().snapshot().elapsed_seconds >= 3);

    handle.control().abandon().unwrap();
    assert_eq!(handle.finished().await.unwrap(), SessionOutcome::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn first_second_is_counted_a_full_period_after_start() {
    let runner = SessionRunner::new(HistoryService::in_memory());
    let handle = runner.start(SessionStateMachine::with_deck(short_deck(1)));

    tokio::time::sleep(Duration::from_millis(900)).await;
    handle.control().start().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(handle.control().snapshot().elapsed_seconds, 0);

    tokio::time::sleep(Duration::from_millis(850)).await;
    assert_eq!(handle.control().snapshot().elapsed_seconds, 1);

    handle.control().abandon().unwrap();
    assert_eq!(handle.finished().await.unwrap(), SessionOutcome::Abandoned);
}

#[tokio::test(start_paused = true)]
async fn rest_waits_for_draw_next_without_auto_advance() {
    let history = HistoryService::in_memory();
    let runner = SessionRunner::new(history.clone()).with_config(SessionConfig::default());
    let handle = runner.start(SessionStateMachine::with_deck(short_deck(1)));
    let control = handle.control().clone();
    let mut updates = control.subscribe();

    control.start().unwrap();
    clear_every_card(&control, 1).await;
    wait_for(&mut updates, |s| s.phase == SessionPhase::Rest).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(control.snapshot().phase, SessionPhase::Rest);

    control.draw_next().unwrap();
    let SessionOutcome::Completed(stats) = handle.finished().await.unwrap() else {
        panic!("session should complete");
    };
    assert_eq!(stats.cards_completed(), 1);
    assert_eq!(history.load_history().await.len(), 1);
}
