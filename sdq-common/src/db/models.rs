//! Database models
//!
//! One struct per season table. `Event` is the root entity; the other four
//! each reference exactly one event by `event_id`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Lifecycle status of a scheduled event
///
/// Stored as text in the `status` column using the labels returned by
/// [`EventStatus::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl EventStatus {
    pub const ALL: [EventStatus; 3] = [
        EventStatus::NotStarted,
        EventStatus::InProgress,
        EventStatus::Completed,
    ];

    /// Column value for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::NotStarted => "Not Started",
            EventStatus::InProgress => "In Progress",
            EventStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown event status: {}", s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub season: String,
    /// Naive local start time, stored as `YYYY-MM-DD HH:MM:SS` with no offset
    pub scheduled_at: NaiveDateTime,
    pub status: EventStatus,
    pub pre_event_data_finalized: bool,
    pub event_data_finalized: bool,
}

/// Snapshot of an event at one step
///
/// `play_id` is set when the snapshot was taken after a recorded play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventState {
    pub event_id: String,
    pub play_id: Option<i64>,
    pub is_final_state: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayLog {
    pub event_id: String,
    pub play_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSet {
    pub event_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub event_id: String,
    pub predictor: String,
}
