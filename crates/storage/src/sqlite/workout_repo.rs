use workout_core::model::{Exercise, WorkoutStats};

use super::SqliteRepository;
use super::mapping::{i64_from_u64, map_workout_row};
use crate::repository::{StorageError, WorkoutHistoryRepository};

fn write_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

#[async_trait::async_trait]
impl WorkoutHistoryRepository for SqliteRepository {
    async fn prepend(&self, stats: &WorkoutStats) -> Result<(), StorageError> {
        let reps = stats.reps_by_exercise();

        sqlx::query(
            r"
                INSERT INTO workouts (
                    id, date_ms, total_reps, duration_secs,
                    push_ups, dips, crunches, burpees,
                    cards_completed, average_form_score
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(stats.id().to_string())
        .bind(stats.date().timestamp_millis())
        .bind(i64::from(stats.total_reps()))
        .bind(i64_from_u64("duration_secs", stats.duration_secs())?)
        .bind(i64::from(reps.get(Exercise::PushUps)))
        .bind(i64::from(reps.get(Exercise::Dips)))
        .bind(i64::from(reps.get(Exercise::Crunches)))
        .bind(i64::from(reps.get(Exercise::Burpees)))
        .bind(i64::from(stats.cards_completed()))
        .bind(stats.average_form_score())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        tracing::debug!(workout = %stats.id(), "workout saved");
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<WorkoutStats>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, date_ms, total_reps, duration_secs,
                    push_ups, dips, crunches, burpees,
                    cards_completed, average_form_score
                FROM workouts
                ORDER BY seq DESC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_workout_row(&row)?);
        }
        Ok(out)
    }

    async fn clear_history(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM workouts")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
