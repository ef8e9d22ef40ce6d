//! Integration tests for the season audit
//!
//! Tests cover:
//! - The reference season scenario, against both store implementations
//! - Coverage of an empty season
//! - Final state, play/state coherence and feature checks on SQLite data
//! - Recommendation determinism and the all-clear case
//! - Fatal errors: unavailable store, malformed or unlisted season

mod helpers;

use helpers::{expected_predictors, reference_season, write_sqlite, SeasonBuilder};
use sdq_audit::quality::QualityCheck;
use sdq_audit::store::{MemorySeasonStore, SeasonStore, SqliteSeasonStore};
use sdq_audit::{audit_database, audit_season, run_audit, AuditSettings, ReportFormat, SeasonReport};
use sdq_common::config::TomlConfig;
use sdq_common::db::connect_readonly;
use sdq_common::{Error, SeasonKey};
use serde_json::Value;
use tempfile::TempDir;

fn season() -> SeasonKey {
    SeasonKey::parse("2024-2025").unwrap()
}

fn settings() -> AuditSettings {
    AuditSettings {
        expected_predictors: expected_predictors(),
        ..AuditSettings::default()
    }
}

/// Seed a temporary SQLite store and audit it through `run_audit`
async fn audit_sqlite(store: &MemorySeasonStore) -> (TempDir, SeasonReport) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("events.sqlite");
    write_sqlite(store, &db_path).await;

    let report = run_audit(&TomlConfig::default(), "2024-2025", &db_path)
        .await
        .expect("Audit should succeed");
    (dir, report)
}

fn outcome(report: &SeasonReport, check: QualityCheck) -> (bool, String) {
    let outcome = report.quality.get(check).expect("check should have run");
    (outcome.passed, outcome.message.clone())
}

// =============================================================================
// Reference scenario
// =============================================================================

#[tokio::test]
async fn test_reference_season_recommendations() {
    let (_dir, report) = audit_sqlite(&reference_season().build()).await;

    assert_eq!(report.stats.total_events, 10);
    assert_eq!(report.stats.completed, 8);
    assert_eq!(report.stats.not_started, 2);
    assert_eq!(report.stats.pre_event_finalized, 8);
    assert!(report.is_clean(), "no quality check should fail: {:?}", report.quality);

    assert_eq!(report.predictions.count("Baseline"), Some(8));
    assert_eq!(report.predictions.count("Linear"), Some(8));
    assert_eq!(
        report.recommendations,
        vec![
            "Monitor 2 upcoming events for automatic update",
            "Generate predictions for model Tree",
            "Generate predictions for model MLP",
        ]
    );
}

#[tokio::test]
async fn test_memory_and_sqlite_stores_agree() {
    let mut builder = reference_season();
    builder
        .in_progress("0022400011", false)
        .clear_final_state("0022400002")
        .remove_feature_set("0022400003")
        .play_logs("0022400004", [9001, 9002])
        .predictions("Tree", &["0022400001", "0022400005", "ghost"]);
    let memory = builder.build();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("events.sqlite");
    write_sqlite(&memory, &db_path).await;
    let pool = connect_readonly(&db_path).await.unwrap();
    let sqlite = SqliteSeasonStore::new(pool.clone());

    let from_memory = audit_season(&memory, &season(), &settings()).await.unwrap();
    let from_sqlite = audit_season(&sqlite, &season(), &settings()).await.unwrap();
    pool.close().await;

    assert_eq!(
        serde_json::to_value(&from_memory).unwrap(),
        serde_json::to_value(&from_sqlite).unwrap()
    );
    assert_eq!(from_sqlite.predictions.count("Tree"), Some(2));
    assert_eq!(from_sqlite.stats.pre_event_gap, 1);
}

// =============================================================================
// Coverage
// =============================================================================

#[tokio::test]
async fn test_empty_season_coverage() {
    let mut other = SeasonBuilder::new("2023-2024");
    other.completed("0022300001", 450);
    let (_dir, report) = audit_sqlite(&other.build()).await;

    assert_eq!(report.stats.total_events, 0);
    assert_eq!(report.coverage.first_date, None);
    assert_eq!(report.coverage.last_date, None);
    assert_eq!(report.coverage.days_covered, 0);

    let json: Value = serde_json::from_str(&report.render(ReportFormat::Json).unwrap()).unwrap();
    assert_eq!(json["coverage"]["first_date"], Value::Null);
    assert_eq!(json["coverage"]["days_covered"], 0);
}

#[tokio::test]
async fn test_coverage_span() {
    let (_dir, report) = audit_sqlite(&reference_season().build()).await;

    assert_eq!(report.coverage.first_date.unwrap().to_string(), "2024-10-22");
    assert_eq!(report.coverage.last_date.unwrap().to_string(), "2024-10-31");
    assert_eq!(report.coverage.days_covered, 10);
}

#[tokio::test]
async fn test_late_evening_events_keep_their_local_day() {
    let late = |day: u32| {
        chrono::NaiveDate::from_ymd_opt(2024, 10, day)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap()
    };
    let mut builder = SeasonBuilder::new("2024-2025");
    builder
        .completed("e1", 400)
        .completed("e2", 400)
        .reschedule("e1", late(22))
        .reschedule("e2", late(23));
    let memory = builder.build();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("events.sqlite");
    write_sqlite(&memory, &db_path).await;
    let pool = connect_readonly(&db_path).await.unwrap();
    let sqlite = SqliteSeasonStore::new(pool.clone());

    let from_memory = audit_season(&memory, &season(), &settings()).await.unwrap();
    let from_sqlite = audit_season(&sqlite, &season(), &settings()).await.unwrap();
    pool.close().await;

    assert_eq!(from_sqlite.coverage, from_memory.coverage);
    assert_eq!(from_sqlite.coverage.first_date.unwrap().to_string(), "2024-10-22");
    assert_eq!(from_sqlite.coverage.last_date.unwrap().to_string(), "2024-10-23");
    assert_eq!(from_sqlite.coverage.days_covered, 2);
}

// =============================================================================
// Consistency checks
// =============================================================================

#[tokio::test]
async fn test_removing_final_states_flips_check() {
    let mut builder = reference_season();
    builder
        .clear_final_state("0022400001")
        .clear_final_state("0022400004");
    let (_dir, report) = audit_sqlite(&builder.build()).await;

    let (passed, message) = outcome(&report, QualityCheck::FinalStateCompleteness);
    assert!(!passed);
    assert_eq!(message, "2 completed events without a final state");
    assert!(report
        .recommendations
        .contains(&"Fix: 2 completed events without a final state".to_string()));
}

#[tokio::test]
async fn test_play_count_band_boundaries() {
    let mut inside = SeasonBuilder::new("2024-2025");
    inside.completed("low", 300).completed("high", 800);
    let (_dir, report) = audit_sqlite(&inside.build()).await;
    assert!(outcome(&report, QualityCheck::PlayStateCoherence).0);

    let mut outside = SeasonBuilder::new("2024-2025");
    outside.completed("low", 299).completed("high", 801);
    let (_dir, report) = audit_sqlite(&outside.build()).await;
    let (passed, message) = outcome(&report, QualityCheck::PlayStateCoherence);
    assert!(!passed);
    assert_eq!(message, "2 events with inconsistent play counts");
}

#[tokio::test]
async fn test_play_state_mismatch_flagged_in_either_direction() {
    let mut extra_logs = SeasonBuilder::new("2024-2025");
    extra_logs.completed("e1", 500).play_logs("e1", [501]);
    let (_dir, report) = audit_sqlite(&extra_logs.build()).await;
    assert!(!outcome(&report, QualityCheck::PlayStateCoherence).0);

    let mut extra_states = SeasonBuilder::new("2024-2025");
    extra_states.completed("e1", 500).play_states("e1", [501]);
    let (_dir, report) = audit_sqlite(&extra_states.build()).await;
    assert!(!outcome(&report, QualityCheck::PlayStateCoherence).0);
}

#[tokio::test]
async fn test_duplicate_play_rows_count_once() {
    let mut builder = SeasonBuilder::new("2024-2025");
    builder.completed("e1", 400).play_logs("e1", [1, 2, 3]).play_states("e1", [4]);
    let (_dir, report) = audit_sqlite(&builder.build()).await;

    assert!(outcome(&report, QualityCheck::PlayStateCoherence).0);
}

#[tokio::test]
async fn test_missing_feature_sets() {
    let mut builder = reference_season();
    builder.remove_feature_set("0022400007");
    let (_dir, report) = audit_sqlite(&builder.build()).await;

    let (passed, message) = outcome(&report, QualityCheck::FeatureCompleteness);
    assert!(!passed);
    assert_eq!(
        message,
        "1 events without features despite finalized pre-event data"
    );
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_all_clear() {
    let mut builder = SeasonBuilder::new("2024-2025");
    for i in 0..4 {
        builder.completed(&format!("e{}", i), 350 + i * 100);
    }
    let ids = builder.completed_ids();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    for predictor in expected_predictors() {
        builder.predictions(&predictor, &ids);
    }

    let (_dir, report) = audit_sqlite(&builder.build()).await;
    assert_eq!(report.recommendations, vec!["All data looks good"]);
}

#[tokio::test]
async fn test_partial_predictions_and_finalization_gap() {
    let mut builder = reference_season();
    builder
        .in_progress("0022400011", false)
        .predictions("Tree", &["0022400001", "0022400002"])
        .predictions("MLP", &["0022400001"]);
    let (_dir, report) = audit_sqlite(&builder.build()).await;

    assert_eq!(
        report.recommendations,
        vec![
            "Monitor 2 upcoming events for automatic update",
            "Finalize pre-event data for 1 events",
            "Complete 6 missing predictions for Tree",
            "Complete 7 missing predictions for MLP",
        ]
    );
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("events.sqlite");
    let mut builder = reference_season();
    builder.clear_final_state("0022400003");
    write_sqlite(&builder.build(), &db_path).await;

    let config = TomlConfig::default();
    let first = run_audit(&config, "2024-2025", &db_path).await.unwrap();
    let second = run_audit(&config, "2024-2025", &db_path).await.unwrap();

    assert_eq!(
        first.render(ReportFormat::Json).unwrap(),
        second.render(ReportFormat::Json).unwrap()
    );
    assert_eq!(first.render_text(), second.render_text());
}

// =============================================================================
// Fatal errors
// =============================================================================

#[tokio::test]
async fn test_missing_store_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_audit(&TomlConfig::default(), "2024-2025", &dir.path().join("missing.sqlite"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable { .. }));
}

#[tokio::test]
async fn test_non_database_file_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("garbage.sqlite");
    std::fs::write(&db_path, vec![b'x'; 4096]).unwrap();

    let err = run_audit(&TomlConfig::default(), "2024-2025", &db_path)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_season_rejected_before_store_access() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_audit(&TomlConfig::default(), "2024-25", &dir.path().join("missing.sqlite"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSeason(_)));
}

#[tokio::test]
async fn test_unlisted_season_strict_and_advisory() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("events.sqlite");
    let mut builder = SeasonBuilder::new("2025-2026");
    builder.completed("e1", 500);
    write_sqlite(&builder.build(), &db_path).await;

    let advisory = TomlConfig::default();
    let report = run_audit(&advisory, "2025-2026", &db_path).await.unwrap();
    assert_eq!(report.stats.total_events, 1);

    let strict = TomlConfig {
        strict_season_check: true,
        ..TomlConfig::default()
    };
    let err = run_audit(&strict, "2025-2026", &db_path).await.unwrap_err();
    assert!(matches!(err, Error::InvalidSeason(_)));
}

#[tokio::test]
async fn test_audit_database_leaves_season_listing_to_caller() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("events.sqlite");
    let mut builder = SeasonBuilder::new("2025-2026");
    builder.completed("e1", 500);
    write_sqlite(&builder.build(), &db_path).await;

    let strict = TomlConfig {
        strict_season_check: true,
        ..TomlConfig::default()
    };
    let season = SeasonKey::parse("2025-2026").unwrap();
    let report = audit_database(&strict, &season, &db_path).await.unwrap();
    assert_eq!(report.stats.total_events, 1);
}

#[tokio::test]
async fn test_report_json_shape() {
    let (_dir, report) = audit_sqlite(&reference_season().build()).await;
    let json: Value = serde_json::from_str(&report.render(ReportFormat::Json).unwrap()).unwrap();

    assert_eq!(json["season"], "2024-2025");
    assert_eq!(json["stats"]["total_events"], 10);
    assert_eq!(json["quality"]["Missing final states"]["passed"], true);
    assert_eq!(json["predictions"]["Linear"], 8);
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_store_trait_object_is_usable() {
    let store: Box<dyn SeasonStore> = Box::new(reference_season().build());
    let counts = store.status_counts(&season()).await.unwrap();
    assert_eq!(counts.total, 10);
}
