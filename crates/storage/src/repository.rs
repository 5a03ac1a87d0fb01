use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use workout_core::model::{Exercise, RepsByExercise, WorkoutId, WorkoutStats};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of a finished workout.
///
/// Field names, the epoch-millisecond `date` and the display-name keys of
/// `repsByExercise` follow the history list layout of earlier versions of
/// the app. Ids must be UUIDs; entries carrying any other id do not load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub total_reps: u32,
    pub duration: u64,
    pub reps_by_exercise: BTreeMap<Exercise, u32>,
    pub cards_completed: u32,
    pub average_form_score: f64,
}

impl WorkoutRecord {
    #[must_use]
    pub fn from_stats(stats: &WorkoutStats) -> Self {
        Self {
            id: stats.id().to_string(),
            date: stats.date(),
            total_reps: stats.total_reps(),
            duration: stats.duration_secs(),
            reps_by_exercise: stats.reps_by_exercise().iter().collect(),
            cards_completed: stats.cards_completed(),
            average_form_score: stats.average_form_score(),
        }
    }

    /// Convert the record back into domain `WorkoutStats`.
    ///
    /// Missing exercise keys read as zero.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the id is not a UUID or the
    /// numbers fail `WorkoutStats` validation.
    pub fn into_stats(self) -> Result<WorkoutStats, StorageError> {
        let id: WorkoutId = self
            .id
            .parse()
            .map_err(|e| StorageError::Serialization(format!("{e}: {}", self.id)))?;
        let count = |e: Exercise| self.reps_by_exercise.get(&e).copied().unwrap_or(0);
        let reps = RepsByExercise::new(
            count(Exercise::PushUps),
            count(Exercise::Dips),
            count(Exercise::Crunches),
            count(Exercise::Burpees),
        );

        WorkoutStats::from_persisted(
            id,
            self.date,
            self.total_reps,
            self.duration,
            reps,
            self.cards_completed,
            self.average_form_score,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Repository contract for the workout history list.
#[async_trait]
pub trait WorkoutHistoryRepository: Send + Sync {
    /// Store `stats` as the newest entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a workout with the same id exists,
    /// or other storage errors.
    async fn prepend(&self, stats: &WorkoutStats) -> Result<(), StorageError>;

    /// All stored workouts, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or holds invalid data.
    async fn list_history(&self) -> Result<Vec<WorkoutStats>, StorageError>;

    /// Remove every stored workout.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_history(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    history: Arc<Mutex<Vec<WorkoutStats>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutHistoryRepository for InMemoryRepository {
    async fn prepend(&self, stats: &WorkoutStats) -> Result<(), StorageError> {
        let mut guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.iter().any(|s| s.id() == stats.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(0, stats.clone());
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<WorkoutStats>, StorageError> {
        let guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn clear_history(&self) -> Result<(), StorageError> {
        let mut guard = self
            .history
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clear();
        Ok(())
    }
}

/// Wraps the history repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub history: Arc<dyn WorkoutHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            history: Arc::new(InMemoryRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workout_core::model::{Card, CardId, Rank, Suit};
    use workout_core::stats::aggregate;
    use workout_core::time::fixed_now;

    fn build_stats(ranks: &[Rank]) -> WorkoutStats {
        let cards: Vec<_> = ranks
            .iter()
            .enumerate()
            .map(|(i, r)| Card::new(CardId::new(u32::try_from(i).unwrap()), Suit::Hearts, *r))
            .collect();
        aggregate(&cards, 60, fixed_now())
    }

    #[tokio::test]
    async fn prepend_keeps_newest_first() {
        let repo = InMemoryRepository::new();
        let first = build_stats(&[Rank::Two]);
        let second = build_stats(&[Rank::Ace]);
        repo.prepend(&first).await.unwrap();
        repo.prepend(&second).await.unwrap();

        let history = repo.list_history().await.unwrap();
        assert_eq!(history, vec![second, first]);
    }

    #[tokio::test]
    async fn duplicate_id_conflicts() {
        let repo = InMemoryRepository::new();
        let stats = build_stats(&[Rank::Two]);
        repo.prepend(&stats).await.unwrap();
        let err = repo.prepend(&stats).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn clear_empties_history() {
        let repo = InMemoryRepository::new();
        repo.prepend(&build_stats(&[Rank::King])).await.unwrap();
        repo.clear_history().await.unwrap();
        assert!(repo.list_history().await.unwrap().is_empty());
    }

    #[test]
    fn record_round_trips_stats() {
        let stats = build_stats(&[Rank::Ten, Rank::Jack]);
        let record = WorkoutRecord::from_stats(&stats);
        assert_eq!(record.reps_by_exercise.len(), 4);
        assert_eq!(record.into_stats().unwrap(), stats);
    }

    #[test]
    fn record_uses_legacy_field_names() {
        let record = WorkoutRecord::from_stats(&build_stats(&[Rank::Five]));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalReps"], 5);
        assert_eq!(json["repsByExercise"]["Push-Ups"], 5);
        assert_eq!(json["repsByExercise"]["Burpees"], 0);
        assert_eq!(json["date"], fixed_now().timestamp_millis());
    }

    #[test]
    fn record_with_non_uuid_id_is_rejected() {
        let mut record = WorkoutRecord::from_stats(&build_stats(&[Rank::Five]));
        record.id = "1718000000000".into();
        assert!(matches!(
            record.into_stats(),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn record_with_bad_totals_is_rejected() {
        let mut record = WorkoutRecord::from_stats(&build_stats(&[Rank::Five]));
        record.total_reps = 99;
        assert!(matches!(
            record.into_stats(),
            Err(StorageError::Serialization(_))
        ));
    }
}
