//! Prediction coverage per predictor

use sdq_common::{Result, SeasonKey};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::store::SeasonStore;

/// Prediction counts keyed by predictor name
///
/// Reports whichever predictors have rows in the season; no list of
/// expected predictors is applied here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PredictionStatus {
    counts: BTreeMap<String, u64>,
}

impl PredictionStatus {
    pub fn count(&self, predictor: &str) -> Option<u64> {
        self.counts.get(predictor).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl From<BTreeMap<String, u64>> for PredictionStatus {
    fn from(counts: BTreeMap<String, u64>) -> Self {
        Self { counts }
    }
}

pub async fn check_predictions(store: &dyn SeasonStore, season: &SeasonKey) -> Result<PredictionStatus> {
    Ok(store.predictions_by_predictor(season).await?.into())
}
