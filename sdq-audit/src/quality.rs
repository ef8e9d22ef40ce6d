//! Cross-table consistency checks
//!
//! Each [`QualityCheck`] targets one failure mode of the ingestion pipeline:
//! final state capture lagging behind event completion, truncated play logs,
//! and feature derivation lagging behind pre-event finalization. Checks are
//! independent of each other; a battery is just an ordered slice of them.

use sdq_common::config::{QualityConfig, DEFAULT_MAX_PLAYS, DEFAULT_MIN_PLAYS};
use sdq_common::{Result, SeasonKey};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use crate::store::{PlayStateCount, SeasonStore};

/// Inclusive range of plausible play log sizes for a completed event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayCountBand {
    pub min: u64,
    pub max: u64,
}

impl PlayCountBand {
    pub const DEFAULT: PlayCountBand = PlayCountBand {
        min: DEFAULT_MIN_PLAYS as u64,
        max: DEFAULT_MAX_PLAYS as u64,
    };

    pub fn contains(&self, plays: u64) -> bool {
        (self.min..=self.max).contains(&plays)
    }
}

impl Default for PlayCountBand {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&QualityConfig> for PlayCountBand {
    fn from(config: &QualityConfig) -> Self {
        Self {
            min: u64::from(config.min_plays),
            max: u64::from(config.max_plays),
        }
    }
}

/// One consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityCheck {
    /// Every completed event has a final event state
    FinalStateCompleteness,
    /// Play log and event state play counts agree and fall inside the band
    PlayStateCoherence,
    /// Every event with finalized pre-event data has a feature set
    FeatureCompleteness,
}

impl QualityCheck {
    /// Default battery, in report order
    pub const ALL: [QualityCheck; 3] = [
        QualityCheck::FinalStateCompleteness,
        QualityCheck::PlayStateCoherence,
        QualityCheck::FeatureCompleteness,
    ];

    /// Report key for this check
    pub fn name(&self) -> &'static str {
        match self {
            QualityCheck::FinalStateCompleteness => "Missing final states",
            QualityCheck::PlayStateCoherence => "Play log / event state coherence",
            QualityCheck::FeatureCompleteness => "Missing feature sets",
        }
    }

    /// Run this check against one season
    pub async fn run(
        &self,
        store: &dyn SeasonStore,
        season: &SeasonKey,
        band: PlayCountBand,
    ) -> Result<CheckOutcome> {
        let outcome = match self {
            QualityCheck::FinalStateCompleteness => {
                let missing = store.completed_without_final_state(season).await?;
                CheckOutcome::from_count(
                    missing,
                    format!("{} completed events without a final state", missing),
                )
            }
            QualityCheck::PlayStateCoherence => {
                let counts = store.play_state_counts(season).await?;
                let flagged: Vec<&PlayStateCount> =
                    counts.iter().filter(|c| is_incoherent(c, band)).collect();
                for count in flagged.iter().take(5) {
                    debug!(
                        event_id = %count.event_id,
                        play_logs = count.play_logs,
                        play_states = count.play_states,
                        "Incoherent play counts"
                    );
                }
                let flagged = flagged.len() as u64;
                CheckOutcome::from_count(
                    flagged,
                    format!("{} events with inconsistent play counts", flagged),
                )
            }
            QualityCheck::FeatureCompleteness => {
                let missing = store.finalized_without_features(season).await?;
                CheckOutcome::from_count(
                    missing,
                    format!(
                        "{} events without features despite finalized pre-event data",
                        missing
                    ),
                )
            }
        };

        if !outcome.passed {
            warn!(season = %season, check = self.name(), "{}", outcome.message);
        }
        Ok(outcome)
    }
}

/// An event's play counts are incoherent when the two sides disagree or the
/// play log size falls outside the band
pub fn is_incoherent(count: &PlayStateCount, band: PlayCountBand) -> bool {
    count.play_logs != count.play_states || !band.contains(count.play_logs)
}

/// Verdict of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub passed: bool,
    pub message: String,
    /// Number of offending events
    #[serde(skip)]
    pub flagged: u64,
}

impl CheckOutcome {
    fn from_count(flagged: u64, message: String) -> Self {
        Self {
            passed: flagged == 0,
            message,
            flagged,
        }
    }
}

/// Ordered check results
///
/// Serializes as a map from check name to `{passed, message}` in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    results: Vec<(QualityCheck, CheckOutcome)>,
}

impl QualityReport {
    pub fn iter(&self) -> impl Iterator<Item = (&QualityCheck, &CheckOutcome)> {
        self.results.iter().map(|(check, outcome)| (check, outcome))
    }

    pub fn get(&self, check: QualityCheck) -> Option<&CheckOutcome> {
        self.results
            .iter()
            .find(|(c, _)| *c == check)
            .map(|(_, outcome)| outcome)
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|(_, outcome)| outcome.passed)
    }

    /// Failed checks in run order
    pub fn failures(&self) -> impl Iterator<Item = (&QualityCheck, &CheckOutcome)> {
        self.iter().filter(|(_, outcome)| !outcome.passed)
    }
}

impl FromIterator<(QualityCheck, CheckOutcome)> for QualityReport {
    fn from_iter<T: IntoIterator<Item = (QualityCheck, CheckOutcome)>>(iter: T) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl Serialize for QualityReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (check, outcome) in &self.results {
            map.serialize_entry(check.name(), outcome)?;
        }
        map.end()
    }
}

/// Run a battery of checks in order
pub async fn check_quality(
    store: &dyn SeasonStore,
    season: &SeasonKey,
    checks: &[QualityCheck],
    band: PlayCountBand,
) -> Result<QualityReport> {
    let mut results = Vec::with_capacity(checks.len());
    for check in checks {
        let outcome = check.run(store, season, band).await?;
        results.push((*check, outcome));
    }
    Ok(QualityReport { results })
}
