//! Test helpers: season fixtures and SQLite seeding

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sdq_audit::store::MemorySeasonStore;
use sdq_common::db::{
    init_database, Event, EventState, EventStatus, FeatureSet, PlayLog, PredictionRecord,
};
use std::path::Path;

/// Builds a season's worth of entities in memory
pub struct SeasonBuilder {
    season: String,
    store: MemorySeasonStore,
}

impl SeasonBuilder {
    pub fn new(season: &str) -> Self {
        Self {
            season: season.to_string(),
            store: MemorySeasonStore::new(),
        }
    }

    fn scheduled_at(&self) -> NaiveDateTime {
        let opening = NaiveDate::from_ymd_opt(2024, 10, 22)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap();
        opening + Duration::days(self.store.events.len() as i64)
    }

    fn push_event(&mut self, id: &str, status: EventStatus, finalized: bool) {
        let scheduled_at = self.scheduled_at();
        self.store.events.push(Event {
            event_id: id.to_string(),
            season: self.season.clone(),
            scheduled_at,
            status,
            pre_event_data_finalized: finalized,
            event_data_finalized: finalized && status == EventStatus::Completed,
        });
    }

    /// Completed, fully finalized event with `plays` plays, one state per
    /// play (the last one final) and a feature set
    pub fn completed(&mut self, id: &str, plays: i64) -> &mut Self {
        self.push_event(id, EventStatus::Completed, true);
        self.play_logs(id, 1..=plays);
        for play_id in 1..=plays {
            self.store.event_states.push(EventState {
                event_id: id.to_string(),
                play_id: Some(play_id),
                is_final_state: play_id == plays,
            });
        }
        if plays == 0 {
            self.store.event_states.push(EventState {
                event_id: id.to_string(),
                play_id: None,
                is_final_state: true,
            });
        }
        self.feature_set(id)
    }

    pub fn upcoming(&mut self, id: &str) -> &mut Self {
        self.push_event(id, EventStatus::NotStarted, false);
        self
    }

    pub fn in_progress(&mut self, id: &str, finalized: bool) -> &mut Self {
        self.push_event(id, EventStatus::InProgress, finalized);
        if finalized {
            self.feature_set(id);
        }
        self
    }

    pub fn play_logs(&mut self, id: &str, plays: impl IntoIterator<Item = i64>) -> &mut Self {
        for play_id in plays {
            self.store.play_logs.push(PlayLog {
                event_id: id.to_string(),
                play_id,
            });
        }
        self
    }

    pub fn play_states(&mut self, id: &str, plays: impl IntoIterator<Item = i64>) -> &mut Self {
        for play_id in plays {
            self.store.event_states.push(EventState {
                event_id: id.to_string(),
                play_id: Some(play_id),
                is_final_state: false,
            });
        }
        self
    }

    pub fn feature_set(&mut self, id: &str) -> &mut Self {
        self.store.feature_sets.push(FeatureSet {
            event_id: id.to_string(),
        });
        self
    }

    /// Move an event to another start time
    pub fn reschedule(&mut self, id: &str, at: NaiveDateTime) -> &mut Self {
        for event in self.store.events.iter_mut().filter(|e| e.event_id == id) {
            event.scheduled_at = at;
        }
        self
    }

    pub fn clear_final_state(&mut self, id: &str) -> &mut Self {
        for state in self.store.event_states.iter_mut().filter(|s| s.event_id == id) {
            state.is_final_state = false;
        }
        self
    }

    pub fn remove_feature_set(&mut self, id: &str) -> &mut Self {
        self.store.feature_sets.retain(|f| f.event_id != id);
        self
    }

    /// One prediction from `predictor` for each listed event id
    pub fn predictions(&mut self, predictor: &str, ids: &[&str]) -> &mut Self {
        for id in ids {
            self.store.predictions.push(PredictionRecord {
                event_id: id.to_string(),
                predictor: predictor.to_string(),
            });
        }
        self
    }

    /// Ids of all completed events so far
    pub fn completed_ids(&self) -> Vec<String> {
        self.store
            .events
            .iter()
            .filter(|e| e.status == EventStatus::Completed)
            .map(|e| e.event_id.clone())
            .collect()
    }

    pub fn build(&self) -> MemorySeasonStore {
        self.store.clone()
    }
}

/// 10 events in 2024-2025: 8 completed with coherent play logs, 2 upcoming,
/// Baseline and Linear predictions for every completed event
pub fn reference_season() -> SeasonBuilder {
    let mut builder = SeasonBuilder::new("2024-2025");
    for i in 0..8 {
        builder.completed(&format!("0022400{:03}", i + 1), 400 + i * 40);
    }
    builder.upcoming("0022400009").upcoming("0022400010");

    let ids = builder.completed_ids();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    builder.predictions("Baseline", &ids).predictions("Linear", &ids);
    builder
}

pub fn expected_predictors() -> Vec<String> {
    ["Baseline", "Linear", "Tree", "MLP"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Write every entity of `store` into a fresh SQLite file at `path`
pub async fn write_sqlite(store: &MemorySeasonStore, path: &Path) {
    let pool = init_database(path).await.expect("Should create test database");
    let mut tx = pool.begin().await.unwrap();

    for event in &store.events {
        sqlx::query(
            "INSERT INTO events (event_id, season, scheduled_at, status,
                                 pre_event_data_finalized, event_data_finalized)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&event.event_id)
        .bind(&event.season)
        .bind(event.scheduled_at.format("%Y-%m-%d %H:%M:%S").to_string())
        .bind(event.status.as_str())
        .bind(event.pre_event_data_finalized)
        .bind(event.event_data_finalized)
        .execute(&mut *tx)
        .await
        .unwrap();
    }

    for state in &store.event_states {
        sqlx::query("INSERT INTO event_states (event_id, play_id, is_final_state) VALUES (?, ?, ?)")
            .bind(&state.event_id)
            .bind(state.play_id)
            .bind(state.is_final_state)
            .execute(&mut *tx)
            .await
            .unwrap();
    }

    for play in &store.play_logs {
        sqlx::query("INSERT INTO play_logs (event_id, play_id) VALUES (?, ?)")
            .bind(&play.event_id)
            .bind(play.play_id)
            .execute(&mut *tx)
            .await
            .unwrap();
    }

    for features in &store.feature_sets {
        sqlx::query("INSERT INTO feature_sets (event_id) VALUES (?)")
            .bind(&features.event_id)
            .execute(&mut *tx)
            .await
            .unwrap();
    }

    for prediction in &store.predictions {
        sqlx::query("INSERT INTO predictions (event_id, predictor) VALUES (?, ?)")
            .bind(&prediction.event_id)
            .bind(&prediction.predictor)
            .execute(&mut *tx)
            .await
            .unwrap();
    }

    tx.commit().await.unwrap();
    pool.close().await;
}
