//! # SDQ Common Library
//!
//! Shared code for the season data quality tools including:
//! - Season key parsing and validation
//! - Entity models for the five season tables
//! - Configuration loading and config file resolution
//! - SQLite connection helpers and schema creation

pub mod config;
pub mod db;
pub mod error;
pub mod season;

pub use error::{Error, Result};
pub use season::SeasonKey;
