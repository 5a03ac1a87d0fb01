use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::{Storage, StorageError, WorkoutHistoryRepository};
use workout_core::model::WorkoutStats;

use crate::error::HistoryError;

/// Where workout history lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryStore {
    Memory,
    /// sqlx connection URL, e.g. `sqlite:///home/me/deck.sqlite3`.
    Sqlite(String),
    /// JSON array file.
    JsonFile(PathBuf),
}

/// Lifetime totals over the stored history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryTotals {
    pub sessions: usize,
    pub total_reps: u64,
    pub total_duration_secs: u64,
    pub cards_completed: u64,
}

impl HistoryTotals {
    #[must_use]
    pub fn from_history(history: &[WorkoutStats]) -> Self {
        history.iter().fold(
            Self {
                sessions: history.len(),
                ..Self::default()
            },
            |mut acc, s| {
                acc.total_reps += u64::from(s.total_reps());
                acc.total_duration_secs += s.duration_secs();
                acc.cards_completed += u64::from(s.cards_completed());
                acc
            },
        )
    }
}

/// Persistence boundary for finished workouts.
///
/// Reads and writes never fail the caller: a failed save is logged and
/// dropped, an unreadable history reads as empty.
#[derive(Clone)]
pub struct HistoryService {
    repo: Arc<dyn WorkoutHistoryRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(repo: Arc<dyn WorkoutHistoryRepository>) -> Self {
        Self { repo }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_storage(&Storage::in_memory())
    }

    #[must_use]
    pub fn from_storage(storage: &Storage) -> Self {
        Self::new(Arc::clone(&storage.history))
    }

    /// Open (and for `SQLite`, migrate) the given store.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` if the database cannot be opened or migrated.
    pub async fn open(store: &HistoryStore) -> Result<Self, HistoryError> {
        let storage = match store {
            HistoryStore::Memory => Storage::in_memory(),
            HistoryStore::Sqlite(url) => Storage::sqlite(url).await?,
            HistoryStore::JsonFile(path) => Storage::json_file(path.clone()),
        };
        Ok(Self::from_storage(&storage))
    }

    /// Record `stats` as the newest workout.
    pub async fn save(&self, stats: &WorkoutStats) {
        match self.repo.prepend(stats).await {
            Ok(()) => tracing::info!(workout = %stats.id(), "workout saved to history"),
            Err(error) => {
                tracing::warn!(workout = %stats.id(), %error, "failed to save workout; dropping it");
            }
        }
    }

    /// All workouts, most recent first. Empty if nothing is stored or the store is unreadable.
    pub async fn load_history(&self) -> Vec<WorkoutStats> {
        self.repo.list_history().await.unwrap_or_else(|error| {
            tracing::warn!(%error, "failed to read workout history; treating as empty");
            Vec::new()
        })
    }

    pub async fn latest(&self) -> Option<WorkoutStats> {
        self.load_history().await.into_iter().next()
    }

    pub async fn totals(&self) -> HistoryTotals {
        HistoryTotals::from_history(&self.load_history().await)
    }

    /// Delete all stored workouts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.repo.clear_history().await
    }
}
