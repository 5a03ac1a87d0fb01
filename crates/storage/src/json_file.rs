//! History stored as a single JSON array, newest workout first.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use workout_core::model::WorkoutStats;

use crate::repository::{Storage, StorageError, WorkoutHistoryRepository, WorkoutRecord};

#[derive(Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<WorkoutRecord>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Connection(e.to_string())),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn write_records(&self, records: &[WorkoutRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        // Write next to the target, then rename over it.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl WorkoutHistoryRepository for JsonFileRepository {
    async fn prepend(&self, stats: &WorkoutStats) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut records = match self.read_records().await {
            Ok(records) => records,
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "history file is corrupt; starting a new list"
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let id = stats.id().to_string();
        if records.iter().any(|r| r.id == id) {
            return Err(StorageError::Conflict);
        }
        records.insert(0, WorkoutRecord::from_stats(stats));
        self.write_records(&records).await?;

        tracing::debug!(workout = %stats.id(), entries = records.len(), "workout saved");
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<WorkoutStats>, StorageError> {
        self.read_records()
            .await?
            .into_iter()
            .map(WorkoutRecord::into_stats)
            .collect()
    }

    async fn clear_history(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Connection(e.to_string())),
        }
    }
}

impl Storage {
    /// Build a `Storage` backed by a JSON history file at `path`.
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            history: Arc::new(JsonFileRepository::new(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workout_core::model::{Card, CardId, Rank, Suit, WorkoutId};
    use workout_core::stats::{aggregate, aggregate_with_form_samples};
    use workout_core::time::fixed_now;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("deck-history-{}", WorkoutId::generate().short()))
            .join(name)
    }

    fn build_stats(rank: Rank) -> WorkoutStats {
        let card = Card::new(CardId::new(0), Suit::Spades, rank);
        aggregate(&[card], 42, fixed_now())
    }

    #[tokio::test]
    async fn missing_file_is_empty_history() {
        let repo = JsonFileRepository::new(scratch_path("none.json"));
        assert!(repo.list_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saves_load_in_reverse_order() {
        let repo = JsonFileRepository::new(scratch_path("history.json"));
        let saved: Vec<_> = [Rank::Two, Rank::Seven, Rank::Queen]
            .into_iter()
            .map(build_stats)
            .collect();
        for stats in &saved {
            repo.prepend(stats).await.unwrap();
        }

        let loaded = repo.list_history().await.unwrap();
        let expected: Vec<_> = saved.into_iter().rev().collect();
        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn fractional_form_scores_load_exactly() {
        let repo = JsonFileRepository::new(scratch_path("form.json"));
        let card = Card::new(CardId::new(3), Suit::Clubs, Rank::Five);
        let saved: Vec<_> = [
            [0.187_661_4, 0.2, 0.175_322_7],
            [0.1, 0.7, 0.3],
            [0.333, 0.666, 0.999],
        ]
        .iter()
        .map(|samples| aggregate_with_form_samples(&[card.clone()], 61, samples, fixed_now()))
        .collect();
        for stats in &saved {
            repo.prepend(stats).await.unwrap();
        }

        let loaded = repo.list_history().await.unwrap();
        for (loaded, saved) in loaded.iter().zip(saved.iter().rev()) {
            assert_eq!(
                loaded.average_form_score().to_bits(),
                saved.average_form_score().to_bits()
            );
            assert_eq!(loaded, saved);
        }
    }

    #[tokio::test]
    async fn corrupt_file_errors_then_is_replaced_on_save() {
        let path = scratch_path("corrupt.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let repo = JsonFileRepository::new(&path);

        assert!(matches!(
            repo.list_history().await,
            Err(StorageError::Serialization(_))
        ));

        let stats = build_stats(Rank::Ace);
        repo.prepend(&stats).await.unwrap();
        assert_eq!(repo.list_history().await.unwrap(), vec![stats]);
    }

    #[tokio::test]
    async fn clear_removes_file() {
        let path = scratch_path("clear.json");
        let repo = JsonFileRepository::new(&path);
        repo.prepend(&build_stats(Rank::Four)).await.unwrap();
        repo.clear_history().await.unwrap();
        assert!(!path.exists());
        repo.clear_history().await.unwrap();
    }
}
