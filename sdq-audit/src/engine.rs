//! Audit entry points
//!
//! `audit_season` runs every checker against any [`SeasonStore`];
//! `run_audit` owns the full invocation against a SQLite file: season
//! validation, connection lifetime, and the audit itself. `audit_database`
//! is the same run for a season the caller already validated.

use sdq_common::config::TomlConfig;
use sdq_common::db::connect_readonly;
use sdq_common::{Result, SeasonKey};
use std::path::Path;
use tracing::info;

use crate::coverage::check_coverage;
use crate::predictions::check_predictions;
use crate::quality::{check_quality, PlayCountBand, QualityCheck};
use crate::recommendations::generate_recommendations;
use crate::report::SeasonReport;
use crate::stats::collect_stats;
use crate::store::{SeasonStore, SqliteSeasonStore};

/// Tunables of one audit run
#[derive(Debug, Clone)]
pub struct AuditSettings {
    pub checks: Vec<QualityCheck>,
    pub play_band: PlayCountBand,
    pub expected_predictors: Vec<String>,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            checks: QualityCheck::ALL.to_vec(),
            play_band: PlayCountBand::DEFAULT,
            expected_predictors: TomlConfig::default().expected_predictors,
        }
    }
}

impl From<&TomlConfig> for AuditSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            checks: QualityCheck::ALL.to_vec(),
            play_band: PlayCountBand::from(&config.quality),
            expected_predictors: config.expected_predictors.clone(),
        }
    }
}

/// Build the full report for one season
///
/// Queries run one after another; the store is never written.
pub async fn audit_season(
    store: &dyn SeasonStore,
    season: &SeasonKey,
    settings: &AuditSettings,
) -> Result<SeasonReport> {
    let stats = collect_stats(store, season).await?;
    let coverage = check_coverage(store, season).await?;
    let quality = check_quality(store, season, &settings.checks, settings.play_band).await?;
    let predictions = check_predictions(store, season).await?;

    let recommendations =
        generate_recommendations(&stats, &quality, &predictions, &settings.expected_predictors)
            .iter()
            .map(ToString::to_string)
            .collect();

    Ok(SeasonReport {
        season: season.clone(),
        stats,
        coverage,
        quality,
        predictions,
        recommendations,
    })
}

/// Audit one season of the SQLite store at `db_path`
///
/// The season key is validated and checked against `valid_seasons` before
/// the store is touched.
pub async fn run_audit(config: &TomlConfig, season: &str, db_path: &Path) -> Result<SeasonReport> {
    let season = SeasonKey::parse(season)?;
    config.check_season_listed(&season)?;
    audit_database(config, &season, db_path).await
}

/// Audit an already validated season of the SQLite store at `db_path`
///
/// Does not consult `valid_seasons`. The single read-only connection is
/// closed before returning, whether the audit succeeded or not.
pub async fn audit_database(
    config: &TomlConfig,
    season: &SeasonKey,
    db_path: &Path,
) -> Result<SeasonReport> {
    info!(season = %season, "Auditing {}", db_path.display());
    let pool = connect_readonly(db_path).await?;
    let store = SqliteSeasonStore::new(pool.clone());

    let result = audit_season(&store, season, &AuditSettings::from(config)).await;
    pool.close().await;

    let report = result?;
    info!(
        season = %season,
        clean = report.is_clean(),
        recommendations = report.recommendations.len(),
        "Audit complete"
    );
    Ok(report)
}
