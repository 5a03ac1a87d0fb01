use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies schema versions that are not yet recorded in `schema_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: workout history.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        // `seq` records save order; history is read newest-save first.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS workouts (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    date_ms INTEGER NOT NULL,
                    total_reps INTEGER NOT NULL CHECK (total_reps >= 0),
                    duration_secs INTEGER NOT NULL CHECK (duration_secs >= 0),
                    push_ups INTEGER NOT NULL CHECK (push_ups >= 0),
                    dips INTEGER NOT NULL CHECK (dips >= 0),
                    crunches INTEGER NOT NULL CHECK (crunches >= 0),
                    burpees INTEGER NOT NULL CHECK (burpees >= 0),
                    cards_completed INTEGER NOT NULL CHECK (cards_completed BETWEEN 0 AND 52),
                    average_form_score REAL NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}
