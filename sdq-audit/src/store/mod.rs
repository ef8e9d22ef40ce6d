//! Entity access layer
//!
//! The checkers never see SQL. They ask a [`SeasonStore`] for named
//! aggregates over one season; any backing store that can answer these
//! queries can be audited.

mod memory;
mod sqlite;

pub use memory::MemorySeasonStore;
pub use sqlite::SqliteSeasonStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use sdq_common::{Result, SeasonKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// Event counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    pub not_started: u64,
    pub in_progress: u64,
    pub completed: u64,
}

/// Event counts by finalization flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FinalizationCounts {
    /// Events whose pre-event data is finalized
    pub pre_event: u64,
    /// Events whose full event data is finalized
    pub full_event: u64,
    /// Events already in progress or completed without finalized pre-event data
    pub started_without_pre_event: u64,
}

/// Calendar span of a season's scheduled events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateSpan {
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub distinct_days: u64,
}

/// Distinct play counts recorded for one completed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayStateCount {
    pub event_id: String,
    /// Distinct play ids in the play log
    pub play_logs: u64,
    /// Distinct play ids referenced by event states
    pub play_states: u64,
}

/// Read-only aggregate queries over one season
#[async_trait]
pub trait SeasonStore: Send + Sync {
    async fn status_counts(&self, season: &SeasonKey) -> Result<StatusCounts>;

    async fn finalization_counts(&self, season: &SeasonKey) -> Result<FinalizationCounts>;

    /// Min/max date and number of distinct days among event timestamps
    async fn date_span(&self, season: &SeasonKey) -> Result<DateSpan>;

    /// Completed events with no final event state
    async fn completed_without_final_state(&self, season: &SeasonKey) -> Result<u64>;

    /// Per-event play log vs event state counts, completed events only,
    /// ordered by event id
    async fn play_state_counts(&self, season: &SeasonKey) -> Result<Vec<PlayStateCount>>;

    /// Events with finalized pre-event data but no feature set
    async fn finalized_without_features(&self, season: &SeasonKey) -> Result<u64>;

    /// Prediction rows per predictor, ignoring rows whose event is unknown
    async fn predictions_by_predictor(&self, season: &SeasonKey) -> Result<BTreeMap<String, u64>>;
}
