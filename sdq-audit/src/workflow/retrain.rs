//! Model retraining batch

use async_trait::async_trait;
use sdq_common::config::RetrainConfig;
use sdq_common::SeasonKey;
use tracing::{error, info, warn};

use crate::report::SeasonReport;

use super::{BatchSummary, CollaboratorError};

/// Retrains one model on a set of seasons and evaluates it on another
#[async_trait]
pub trait ModelRetrainer: Send + Sync {
    async fn retrain(
        &self,
        model: &str,
        training_seasons: &[SeasonKey],
        test_season: &SeasonKey,
    ) -> Result<(), CollaboratorError>;
}

/// Which models to retrain and on which seasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrainPlan {
    pub models: Vec<String>,
    pub training_seasons: Vec<SeasonKey>,
    pub test_season: SeasonKey,
}

impl RetrainPlan {
    pub fn from_config(config: &RetrainConfig) -> sdq_common::Result<Self> {
        let training_seasons = config
            .training_seasons
            .iter()
            .map(|s| SeasonKey::parse(s))
            .collect::<sdq_common::Result<Vec<_>>>()?;

        Ok(Self {
            models: config.models.clone(),
            training_seasons,
            test_season: SeasonKey::parse(&config.test_season)?,
        })
    }
}

/// Retrain every model in the plan, continuing past failures
pub async fn retrain_all(retrainer: &dyn ModelRetrainer, plan: &RetrainPlan) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for model in &plan.models {
        info!(
            model = %model,
            training = ?plan.training_seasons.iter().map(ToString::to_string).collect::<Vec<_>>(),
            test = %plan.test_season,
            "Retraining model"
        );
        let result = retrainer
            .retrain(model, &plan.training_seasons, &plan.test_season)
            .await;
        if let Err(e) = &result {
            error!(model = %model, "Retraining failed: {}", e);
        }
        summary.record(model, result);
    }

    summary
}

/// Retrain only when `report` has no failed consistency check
///
/// Returns `None` without calling the retrainer when the audit found
/// integrity failures.
pub async fn retrain_if_clean(
    retrainer: &dyn ModelRetrainer,
    plan: &RetrainPlan,
    report: &SeasonReport,
) -> Option<BatchSummary> {
    if !report.is_clean() {
        let failed: Vec<&str> = report.quality.failures().map(|(check, _)| check.name()).collect();
        warn!(season = %report.season, ?failed, "Audit not clean, retraining skipped");
        return None;
    }
    Some(retrain_all(retrainer, plan).await)
}
