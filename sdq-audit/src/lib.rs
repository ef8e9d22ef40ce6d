//! sdq-audit library - season data quality validation
//!
//! Answers whether one season's data is complete, internally consistent and
//! ready to feed the prediction models. Every component reads through a
//! [`store::SeasonStore`]; nothing here writes to the store.

pub mod coverage;
pub mod engine;
pub mod predictions;
pub mod quality;
pub mod recommendations;
pub mod report;
pub mod stats;
pub mod store;
pub mod workflow;

pub use engine::{audit_database, audit_season, run_audit, AuditSettings};
pub use report::{ReportFormat, SeasonReport};
