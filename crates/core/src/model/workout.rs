use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::deck::DECK_SIZE;
use crate::model::{Exercise, WorkoutId};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum WorkoutStatsError {
    #[error("total reps ({total}) does not match per-exercise reps ({sum})")]
    CountMismatch { total: u32, sum: u32 },

    #[error("cards completed ({0}) exceeds deck size")]
    TooManyCards(u32),

    #[error("average form score must be a percentage, got {0}")]
    InvalidFormScore(f64),
}

/// Rep totals keyed by exercise. Every exercise is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepsByExercise {
    push_ups: u32,
    dips: u32,
    crunches: u32,
    burpees: u32,
}

impl RepsByExercise {
    #[must_use]
    pub fn new(push_ups: u32, dips: u32, crunches: u32, burpees: u32) -> Self {
        Self {
            push_ups,
            dips,
            crunches,
            burpees,
        }
    }

    #[must_use]
    pub fn get(&self, exercise: Exercise) -> u32 {
        match exercise {
            Exercise::PushUps => self.push_ups,
            Exercise::Dips => self.dips,
            Exercise::Crunches => self.crunches,
            Exercise::Burpees => self.burpees,
        }
    }

    pub fn add(&mut self, exercise: Exercise, reps: u32) {
        let slot = match exercise {
            Exercise::PushUps => &mut self.push_ups,
            Exercise::Dips => &mut self.dips,
            Exercise::Crunches => &mut self.crunches,
            Exercise::Burpees => &mut self.burpees,
        };
        *slot = slot.saturating_add(reps);
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.push_ups
            .saturating_add(self.dips)
            .saturating_add(self.crunches)
            .saturating_add(self.burpees)
    }

    /// Iterates in canonical exercise order.
    pub fn iter(&self) -> impl Iterator<Item = (Exercise, u32)> + '_ {
        Exercise::ALL.into_iter().map(|e| (e, self.get(e)))
    }
}

/// Summary of one finished workout.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutStats {
    id: WorkoutId,
    date: DateTime<Utc>,
    total_reps: u32,
    duration_secs: u64,
    reps_by_exercise: RepsByExercise,
    cards_completed: u32,
    average_form_score: f64,
}

impl WorkoutStats {
    /// Rehydrate a workout from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `WorkoutStatsError` if the totals disagree, the card count is
    /// larger than a deck, or the form score is not in `0..=100`.
    pub fn from_persisted(
        id: WorkoutId,
        date: DateTime<Utc>,
        total_reps: u32,
        duration_secs: u64,
        reps_by_exercise: RepsByExercise,
        cards_completed: u32,
        average_form_score: f64,
    ) -> Result<Self, WorkoutStatsError> {
        let sum = reps_by_exercise.total();
        if sum != total_reps {
            return Err(WorkoutStatsError::CountMismatch {
                total: total_reps,
                sum,
            });
        }
        if usize::try_from(cards_completed).map_or(true, |n| n > DECK_SIZE) {
            return Err(WorkoutStatsError::TooManyCards(cards_completed));
        }
        if !average_form_score.is_finite() || !(0.0..=100.0).contains(&average_form_score) {
            return Err(WorkoutStatsError::InvalidFormScore(average_form_score));
        }

        Ok(Self::assemble(
            id,
            date,
            duration_secs,
            reps_by_exercise,
            cards_completed,
            average_form_score,
        ))
    }

    pub(crate) fn assemble(
        id: WorkoutId,
        date: DateTime<Utc>,
        duration_secs: u64,
        reps_by_exercise: RepsByExercise,
        cards_completed: u32,
        average_form_score: f64,
    ) -> Self {
        Self {
            id,
            date,
            total_reps: reps_by_exercise.total(),
            duration_secs,
            reps_by_exercise,
            cards_completed,
            average_form_score,
        }
    }

    #[must_use]
    pub fn id(&self) -> WorkoutId {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn total_reps(&self) -> u32 {
        self.total_reps
    }

    /// Elapsed session time in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    #[must_use]
    pub fn reps_by_exercise(&self) -> &RepsByExercise {
        &self.reps_by_exercise
    }

    #[must_use]
    pub fn cards_completed(&self) -> u32 {
        self.cards_completed
    }

    #[must_use]
    pub fn average_form_score(&self) -> f64 {
        self.average_form_score
    }
}
