//! In-memory season store
//!
//! Holds plain entity vectors and answers the same aggregates as the SQLite
//! store. Used for fixtures and for auditing data that never touched disk.

use async_trait::async_trait;
use sdq_common::db::{Event, EventState, EventStatus, FeatureSet, PlayLog, PredictionRecord};
use sdq_common::{Result, SeasonKey};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::{DateSpan, FinalizationCounts, PlayStateCount, SeasonStore, StatusCounts};

#[derive(Debug, Clone, Default)]
pub struct MemorySeasonStore {
    pub events: Vec<Event>,
    pub event_states: Vec<EventState>,
    pub play_logs: Vec<PlayLog>,
    pub feature_sets: Vec<FeatureSet>,
    pub predictions: Vec<PredictionRecord>,
}

impl MemorySeasonStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn season_events<'a>(&'a self, season: &SeasonKey) -> impl Iterator<Item = &'a Event> + 'a {
        let label = season.as_label();
        self.events.iter().filter(move |e| e.season == label)
    }
}

#[async_trait]
impl SeasonStore for MemorySeasonStore {
    async fn status_counts(&self, season: &SeasonKey) -> Result<StatusCounts> {
        let mut counts = StatusCounts::default();
        for event in self.season_events(season) {
            counts.total += 1;
            match event.status {
                EventStatus::NotStarted => counts.not_started += 1,
                EventStatus::InProgress => counts.in_progress += 1,
                EventStatus::Completed => counts.completed += 1,
            }
        }
        Ok(counts)
    }

    async fn finalization_counts(&self, season: &SeasonKey) -> Result<FinalizationCounts> {
        let mut counts = FinalizationCounts::default();
        for event in self.season_events(season) {
            if event.pre_event_data_finalized {
                counts.pre_event += 1;
            } else if event.status != EventStatus::NotStarted {
                counts.started_without_pre_event += 1;
            }
            if event.event_data_finalized {
                counts.full_event += 1;
            }
        }
        Ok(counts)
    }

    async fn date_span(&self, season: &SeasonKey) -> Result<DateSpan> {
        let days: BTreeSet<_> = self
            .season_events(season)
            .map(|e| e.scheduled_at.date())
            .collect();

        Ok(DateSpan {
            first: days.first().copied(),
            last: days.last().copied(),
            distinct_days: days.len() as u64,
        })
    }

    async fn completed_without_final_state(&self, season: &SeasonKey) -> Result<u64> {
        let with_final: HashSet<&str> = self
            .event_states
            .iter()
            .filter(|s| s.is_final_state)
            .map(|s| s.event_id.as_str())
            .collect();

        Ok(self
            .season_events(season)
            .filter(|e| e.status == EventStatus::Completed)
            .filter(|e| !with_final.contains(e.event_id.as_str()))
            .count() as u64)
    }

    async fn play_state_counts(&self, season: &SeasonKey) -> Result<Vec<PlayStateCount>> {
        let mut counts: Vec<PlayStateCount> = self
            .season_events(season)
            .filter(|e| e.status == EventStatus::Completed)
            .map(|e| {
                let play_logs: HashSet<i64> = self
                    .play_logs
                    .iter()
                    .filter(|p| p.event_id == e.event_id)
                    .map(|p| p.play_id)
                    .collect();
                let play_states: HashSet<i64> = self
                    .event_states
                    .iter()
                    .filter(|s| s.event_id == e.event_id)
                    .filter_map(|s| s.play_id)
                    .collect();

                PlayStateCount {
                    event_id: e.event_id.clone(),
                    play_logs: play_logs.len() as u64,
                    play_states: play_states.len() as u64,
                }
            })
            .collect();

        counts.sort_by(|a, b| a.event_id.cmp(&b.event_id));
        Ok(counts)
    }

    async fn finalized_without_features(&self, season: &SeasonKey) -> Result<u64> {
        let with_features: HashSet<&str> = self
            .feature_sets
            .iter()
            .map(|f| f.event_id.as_str())
            .collect();

        Ok(self
            .season_events(season)
            .filter(|e| e.pre_event_data_finalized)
            .filter(|e| !with_features.contains(e.event_id.as_str()))
            .count() as u64)
    }

    async fn predictions_by_predictor(&self, season: &SeasonKey) -> Result<BTreeMap<String, u64>> {
        let season_ids: HashSet<&str> = self
            .season_events(season)
            .map(|e| e.event_id.as_str())
            .collect();

        let mut counts = BTreeMap::new();
        for record in &self.predictions {
            if season_ids.contains(record.event_id.as_str()) {
                *counts.entry(record.predictor.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
