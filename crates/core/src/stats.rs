//! End-of-session statistics.

use chrono::{DateTime, SubsecRound, Utc};

use crate::model::{Card, RepsByExercise, WorkoutId, WorkoutStats};

/// Form score reported when the rep source supplies no confidence samples.
pub const DEFAULT_FORM_SCORE: f64 = 92.0;

/// Folds completed cards into a fresh `WorkoutStats` using the default form score.
#[must_use]
pub fn aggregate(completed: &[Card], elapsed_seconds: u64, now: DateTime<Utc>) -> WorkoutStats {
    aggregate_with_form_samples(completed, elapsed_seconds, &[], now)
}

/// Like [`aggregate`], deriving the form score from rep-signal confidences.
///
/// Samples are expected in `0.0..=1.0`; the score is their mean as a
/// percentage. An empty slice falls back to [`DEFAULT_FORM_SCORE`].
///
/// Every call mints a new id and stamps `now` (at millisecond precision), so
/// two calls over the same cards yield two distinct records.
#[must_use]
pub fn aggregate_with_form_samples(
    completed: &[Card],
    elapsed_seconds: u64,
    form_samples: &[f64],
    now: DateTime<Utc>,
) -> WorkoutStats {
    let mut reps = RepsByExercise::default();
    for card in completed {
        reps.add(card.exercise(), card.value());
    }

    let cards_completed = u32::try_from(completed.len()).unwrap_or(u32::MAX);

    WorkoutStats::assemble(
        WorkoutId::generate(),
        now.trunc_subsecs(3),
        elapsed_seconds,
        reps,
        cards_completed,
        form_score(form_samples),
    )
}

#[allow(clippy::cast_precision_loss)]
fn form_score(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return DEFAULT_FORM_SCORE;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    (mean * 100.0).clamp(0.0, 100.0)
}
