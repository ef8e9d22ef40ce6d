//! Per-predictor database update batch

use async_trait::async_trait;
use sdq_common::config::UpdateConfig;
use sdq_common::{Error, SeasonKey};
use tokio::process::Command;
use tracing::{error, info};

use super::{BatchSummary, CollaboratorError};

/// Ingests one season's data with one predictor's outputs
#[async_trait]
pub trait DatabaseUpdater: Send + Sync {
    async fn update(&self, season: &SeasonKey, predictor: &str) -> Result<(), CollaboratorError>;
}

/// Runs the configured external updater program once per predictor
#[derive(Debug, Clone)]
pub struct CommandUpdater {
    program: String,
    args: Vec<String>,
}

impl CommandUpdater {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &UpdateConfig) -> sdq_common::Result<Self> {
        let program = config
            .program
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::Config("update.program is not configured".to_string()))?;
        Ok(Self::new(program, config.args.clone()))
    }

    /// Arguments with `{season}` and `{predictor}` filled in
    pub fn expand_args(&self, season: &SeasonKey, predictor: &str) -> Vec<String> {
        let season = season.as_label();
        self.args
            .iter()
            .map(|arg| arg.replace("{season}", &season).replace("{predictor}", predictor))
            .collect()
    }
}

#[async_trait]
impl DatabaseUpdater for CommandUpdater {
    async fn update(&self, season: &SeasonKey, predictor: &str) -> Result<(), CollaboratorError> {
        let output = Command::new(&self.program)
            .args(self.expand_args(season, predictor))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CollaboratorError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(CollaboratorError::Exited {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Update a season once per predictor, continuing past failures
pub async fn update_season(
    updater: &dyn DatabaseUpdater,
    season: &SeasonKey,
    predictors: &[String],
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for predictor in predictors {
        info!(season = %season, predictor = %predictor, "Updating database");
        let result = updater.update(season, predictor).await;
        match &result {
            Ok(()) => info!(predictor = %predictor, "Update succeeded"),
            Err(e) => error!(predictor = %predictor, "Update failed: {}", e),
        }
        summary.record(predictor, result);
    }

    summary
}
