//! SQLite-backed season store

use async_trait::async_trait;
use chrono::NaiveDate;
use sdq_common::db::EventStatus;
use sdq_common::{Error, Result, SeasonKey};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

use super::{DateSpan, FinalizationCounts, PlayStateCount, SeasonStore, StatusCounts};

/// Season store over the `events`, `event_states`, `play_logs`,
/// `feature_sets` and `predictions` tables
#[derive(Clone)]
pub struct SqliteSeasonStore {
    pool: SqlitePool,
}

impl SqliteSeasonStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn parse_day(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map_err(|e| Error::InvalidInput(format!("Unparseable event date '{}': {}", s, e)))
        })
        .transpose()
}

#[async_trait]
impl SeasonStore for SqliteSeasonStore {
    async fn status_counts(&self, season: &SeasonKey) -> Result<StatusCounts> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM events
            WHERE season = ?
            GROUP BY status
            "#,
        )
        .bind(season.as_label())
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            let count = to_count(count);
            counts.total += count;
            match status.parse::<EventStatus>()? {
                EventStatus::NotStarted => counts.not_started += count,
                EventStatus::InProgress => counts.in_progress += count,
                EventStatus::Completed => counts.completed += count,
            }
        }

        debug!(season = %season, ?counts, "Loaded status counts");
        Ok(counts)
    }

    async fn finalization_counts(&self, season: &SeasonKey) -> Result<FinalizationCounts> {
        let (pre_event, full_event, started_without_pre_event) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT
                    COALESCE(SUM(CASE WHEN pre_event_data_finalized = 1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN event_data_finalized = 1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status != 'Not Started'
                                       AND pre_event_data_finalized = 0 THEN 1 ELSE 0 END), 0)
                FROM events
                WHERE season = ?
                "#,
            )
            .bind(season.as_label())
            .fetch_one(&self.pool)
            .await?;

        Ok(FinalizationCounts {
            pre_event: to_count(pre_event),
            full_event: to_count(full_event),
            started_without_pre_event: to_count(started_without_pre_event),
        })
    }

    async fn date_span(&self, season: &SeasonKey) -> Result<DateSpan> {
        // scheduled_at carries no offset, so date() keeps the local day
        let (first, last, days) = sqlx::query_as::<_, (Option<String>, Option<String>, i64)>(
            r#"
            SELECT
                MIN(date(scheduled_at)),
                MAX(date(scheduled_at)),
                COUNT(DISTINCT date(scheduled_at))
            FROM events
            WHERE season = ?
            "#,
        )
        .bind(season.as_label())
        .fetch_one(&self.pool)
        .await?;

        Ok(DateSpan {
            first: parse_day(first)?,
            last: parse_day(last)?,
            distinct_days: to_count(days),
        })
    }

    async fn completed_without_final_state(&self, season: &SeasonKey) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM events e
            WHERE e.season = ?
              AND e.status = 'Completed'
              AND NOT EXISTS (
                  SELECT 1 FROM event_states s
                  WHERE s.event_id = e.event_id AND s.is_final_state = 1
              )
            "#,
        )
        .bind(season.as_label())
        .fetch_one(&self.pool)
        .await?;

        Ok(to_count(count))
    }

    async fn play_state_counts(&self, season: &SeasonKey) -> Result<Vec<PlayStateCount>> {
        // Correlated subqueries keep the two distinct counts independent;
        // joining both tables at once would multiply rows per event.
        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            r#"
            SELECT
                e.event_id,
                (SELECT COUNT(DISTINCT p.play_id) FROM play_logs p
                 WHERE p.event_id = e.event_id),
                (SELECT COUNT(DISTINCT s.play_id) FROM event_states s
                 WHERE s.event_id = e.event_id)
            FROM events e
            WHERE e.season = ? AND e.status = 'Completed'
            ORDER BY e.event_id
            "#,
        )
        .bind(season.as_label())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(event_id, play_logs, play_states)| PlayStateCount {
                event_id,
                play_logs: to_count(play_logs),
                play_states: to_count(play_states),
            })
            .collect())
    }

    async fn finalized_without_features(&self, season: &SeasonKey) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM events e
            WHERE e.season = ?
              AND e.pre_event_data_finalized = 1
              AND NOT EXISTS (
                  SELECT 1 FROM feature_sets f WHERE f.event_id = e.event_id
              )
            "#,
        )
        .bind(season.as_label())
        .fetch_one(&self.pool)
        .await?;

        Ok(to_count(count))
    }

    async fn predictions_by_predictor(&self, season: &SeasonKey) -> Result<BTreeMap<String, u64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT p.predictor, COUNT(*)
            FROM predictions p
            JOIN events e ON p.event_id = e.event_id
            WHERE e.season = ?
            GROUP BY p.predictor
            "#,
        )
        .bind(season.as_label())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(predictor, count)| (predictor, to_count(count)))
            .collect())
    }
}
