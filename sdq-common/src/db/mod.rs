//! Database access helpers
//!
//! The audit only ever reads; `connect_readonly` is the one way it opens the
//! store. `init_database` exists for fixtures and tooling that need an empty
//! store with the season schema.

pub mod init;
pub mod models;

pub use init::*;
pub use models::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::debug;

use crate::{Error, Result};

/// Open the store read-only with a single connection
///
/// The returned pool holds exactly one connection so every query of an audit
/// run goes through the same handle. Callers close it with
/// [`SqlitePool::close`] once done; dropping it releases the connection too.
///
/// A file that is not a SQLite database, or has no `events` table, is
/// reported as [`Error::StoreUnavailable`] before the pool is returned.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::StoreUnavailable {
            path: db_path.to_path_buf(),
            reason: "database file not found".to_string(),
        });
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| Error::StoreUnavailable {
            path: db_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if let Err(reason) = check_schema(&pool).await {
        pool.close().await;
        return Err(Error::StoreUnavailable {
            path: db_path.to_path_buf(),
            reason,
        });
    }

    debug!("Opened read-only store: {}", db_path.display());
    Ok(pool)
}

async fn check_schema(pool: &SqlitePool) -> std::result::Result<(), String> {
    let tables: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'events'",
    )
    .fetch_one(pool)
    .await
    .map_err(|e| e.to_string())?;

    if tables == 0 {
        return Err("events table not found".to_string());
    }
    Ok(())
}
