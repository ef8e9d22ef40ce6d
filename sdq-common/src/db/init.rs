//! Database initialization
//!
//! Creates the five season tables. Every statement is idempotent so the
//! function can be pointed at an existing store.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) a read-write store and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    create_events_table(&pool).await?;
    create_event_states_table(&pool).await?;
    create_play_logs_table(&pool).await?;
    create_feature_sets_table(&pool).await?;
    create_predictions_table(&pool).await?;

    Ok(pool)
}

async fn create_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            event_id TEXT PRIMARY KEY,
            season TEXT NOT NULL,
            scheduled_at TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('Not Started', 'In Progress', 'Completed')),
            pre_event_data_finalized INTEGER NOT NULL DEFAULT 0,
            event_data_finalized INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_season ON events(season)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_event_states_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_states (
            event_id TEXT NOT NULL REFERENCES events(event_id),
            play_id INTEGER,
            is_final_state INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_event_states_event ON event_states(event_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_play_logs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS play_logs (
            event_id TEXT NOT NULL REFERENCES events(event_id),
            play_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_play_logs_event ON play_logs(event_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_feature_sets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feature_sets (
            event_id TEXT NOT NULL REFERENCES events(event_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Predictions are not declared with a foreign key: orphaned rows do occur
/// in ingested data and the audit drops them by joining against `events`.
async fn create_predictions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            event_id TEXT NOT NULL,
            predictor TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_predictions_event ON predictions(event_id)")
        .execute(pool)
        .await?;

    Ok(())
}
