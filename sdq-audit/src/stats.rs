//! General season statistics

use sdq_common::{Result, SeasonKey};
use serde::Serialize;

use crate::store::SeasonStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeasonStats {
    pub total_events: u64,
    pub completed: u64,
    pub in_progress: u64,
    pub not_started: u64,
    pub pre_event_finalized: u64,
    pub event_data_finalized: u64,
    /// Started or completed events whose pre-event data is still open
    pub pre_event_gap: u64,
}

pub async fn collect_stats(store: &dyn SeasonStore, season: &SeasonKey) -> Result<SeasonStats> {
    let status = store.status_counts(season).await?;
    let finalized = store.finalization_counts(season).await?;

    Ok(SeasonStats {
        total_events: status.total,
        completed: status.completed,
        in_progress: status.in_progress,
        not_started: status.not_started,
        pre_event_finalized: finalized.pre_event,
        event_data_finalized: finalized.full_event,
        pre_event_gap: finalized.started_without_pre_event,
    })
}

impl SeasonStats {
    /// Labelled rows for console output
    pub fn rows(&self) -> [(&'static str, u64); 7] {
        [
            ("Total events", self.total_events),
            ("Completed", self.completed),
            ("In progress", self.in_progress),
            ("Not started", self.not_started),
            ("Pre-event data finalized", self.pre_event_finalized),
            ("Event data finalized", self.event_data_finalized),
            ("Started without pre-event data", self.pre_event_gap),
        ]
    }
}
