//! Stdout presentation and keyboard input for a running session.

use std::io::Write;
use std::time::Duration;

use services::{Announcer, SessionControl, SessionCues, announcement_text};
use tokio::sync::mpsc;
use workout_core::model::{Card, Exercise, WorkoutStats};
use workout_core::session::SessionPhase;
use workout_core::time::format_elapsed;

/// Prints cues and announcements as plain lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalCues;

impl Announcer for TerminalCues {
    fn announce(&self, target_reps: u32, exercise: Exercise) {
        say(&format!(">> {}", announcement_text(target_reps, exercise)));
    }
}

impl SessionCues for TerminalCues {
    fn card_drawn(&self, index: usize, card: &Card) {
        say(&format!("\nCard {}: {}", index + 1, card.label()));
    }

    fn rep_counted(&self, reps: u32, target: u32) {
        say(&format!("   rep {reps}/{target}"));
    }

    fn card_completed(&self, card: &Card) {
        say(&format!("   {} cleared.", card.label()));
    }
}

fn say(line: &str) {
    let mut out = std::io::stdout().lock();
    // A closed stdout is not worth aborting the workout for.
    let _ = writeln!(out, "{line}");
    let _ = out.flush();
}

/// Reads stdin on a dedicated thread. Tokio's stdin handle would keep the
/// runtime alive on shutdown while a read is pending.
pub fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Maps key presses to session events: Enter does whatever the current phase
/// calls for, `q` abandons. End of input abandons unless `keep_on_eof`.
pub async fn drive_from_input(
    control: SessionControl,
    mut lines: mpsc::UnboundedReceiver<String>,
    keep_on_eof: bool,
) {
    while let Some(line) = lines.recv().await {
        let sent = if line.trim().eq_ignore_ascii_case("q") {
            control.abandon()
        } else {
            match control.snapshot().phase {
                SessionPhase::Prep => control.start(),
                SessionPhase::Exercising => control.rep_observed(None),
                SessionPhase::Rest => control.draw_next(),
                SessionPhase::Drawing | SessionPhase::Finished => Ok(()),
            }
        };
        if sent.is_err() {
            return;
        }
    }
    if !keep_on_eof {
        tracing::info!("input closed; abandoning session");
        let _ = control.abandon();
    }
}

/// Stand-in rep source: starts the session, then reports one rep per period
/// while a set is in progress.
pub async fn simulate_reps(control: SessionControl, period: Duration) {
    if control.start().is_err() {
        return;
    }
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        if control.snapshot().phase == SessionPhase::Exercising
            && control.rep_observed(None).is_err()
        {
            return;
        }
    }
}

pub fn print_summary(stats: &WorkoutStats) {
    say("\n=== DECK COMPLETE ===");
    say(&format!("Time:        {}", format_elapsed(stats.duration_secs())));
    say(&format!("Total reps:  {}", stats.total_reps()));
    say(&format!("Cards:       {}", stats.cards_completed()));
    for (exercise, reps) in stats.reps_by_exercise().iter() {
        say(&format!("  {:<10} {reps}", exercise.display_name()));
    }
    say(&format!("Form score:  {:.0}", stats.average_form_score()));
}
