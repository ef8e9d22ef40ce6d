//! Common error types for SDQ

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for SDQ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the SDQ crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backing store could not be opened
    #[error("Store unavailable at {}: {reason}", path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// Season key is malformed or rejected
    #[error("Invalid season: {0}")]
    InvalidSeason(String),

    /// Invalid user input or stored value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
