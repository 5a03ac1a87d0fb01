use chrono::{DateTime, Utc};
use sqlx::Row;
use workout_core::model::{RepsByExercise, WorkoutId, WorkoutStats};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_u64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn count(row: &sqlx::sqlite::SqliteRow, field: &'static str) -> Result<u32, StorageError> {
    u32_from_i64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

pub(crate) fn map_workout_row(row: &sqlx::sqlite::SqliteRow) -> Result<WorkoutStats, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id: WorkoutId = id.parse().map_err(ser)?;
    let date_ms: i64 = row.try_get("date_ms").map_err(ser)?;
    let date = DateTime::<Utc>::from_timestamp_millis(date_ms)
        .ok_or_else(|| StorageError::Serialization(format!("invalid date_ms: {date_ms}")))?;
    let duration_secs = u64_from_i64(
        "duration_secs",
        row.try_get::<i64, _>("duration_secs").map_err(ser)?,
    )?;
    let reps = RepsByExercise::new(
        count(row, "push_ups")?,
        count(row, "dips")?,
        count(row, "crunches")?,
        count(row, "burpees")?,
    );
    let average_form_score: f64 = row.try_get("average_form_score").map_err(ser)?;

    WorkoutStats::from_persisted(
        id,
        date,
        count(row, "total_reps")?,
        duration_secs,
        reps,
        count(row, "cards_completed")?,
        average_form_score,
    )
    .map_err(ser)
}
