//! Temporal coverage of a season

use chrono::NaiveDate;
use sdq_common::{Result, SeasonKey};
use serde::Serialize;

use crate::store::SeasonStore;

/// First/last event day and number of distinct days with events
///
/// An empty season has no first or last date and zero days covered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub days_covered: u64,
}

pub async fn check_coverage(store: &dyn SeasonStore, season: &SeasonKey) -> Result<CoverageReport> {
    let span = store.date_span(season).await?;

    Ok(CoverageReport {
        first_date: span.first,
        last_date: span.last,
        days_covered: span.distinct_days,
    })
}
