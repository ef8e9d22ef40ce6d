//! Season-update workflow around the audit
//!
//! The database updater and the model retrainer are external collaborators
//! reached through traits. A batch runs every item in order and isolates
//! failures: one predictor or model failing is logged and recorded, and the
//! rest of the batch still runs. The gap then shows up in the next audit as
//! a prediction-coverage recommendation.

mod artifacts;
mod retrain;
mod update;

pub use artifacts::{latest_artifacts, ArtifactStatus};
pub use retrain::{retrain_all, retrain_if_clean, ModelRetrainer, RetrainPlan};
pub use update::{update_season, CommandUpdater, DatabaseUpdater};

use thiserror::Error;

/// Failure of one collaborator call
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// External program could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External program ran and reported failure
    #[error("{program} exited with {status}: {stderr}")]
    Exited {
        program: String,
        status: String,
        stderr: String,
    },

    /// Collaborator-specific failure
    #[error("{0}")]
    Failed(String),
}

/// One failed batch item
#[derive(Debug)]
pub struct BatchFailure {
    pub item: String,
    pub error: CollaboratorError,
}

/// Outcome of a batch of collaborator calls
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, item: &str, result: Result<(), CollaboratorError>) {
        match result {
            Ok(()) => self.succeeded.push(item.to_string()),
            Err(error) => self.failed.push(BatchFailure {
                item: item.to_string(),
                error,
            }),
        }
    }
}
