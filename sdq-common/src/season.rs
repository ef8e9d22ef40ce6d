//! Season keys
//!
//! A season is labelled by two consecutive years, e.g. `2024-2025`. Every
//! query against the store is scoped by one of these keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Validated `YYYY-YYYY` season label with consecutive years
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeasonKey {
    start_year: u16,
}

impl SeasonKey {
    /// Parse and validate a season key
    ///
    /// Rejects anything that is not two four-digit years separated by a
    /// single hyphen, and year pairs that are not consecutive.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |why: &str| Error::InvalidSeason(format!("'{}': {}", raw, why));

        let (start, end) = raw
            .split_once('-')
            .ok_or_else(|| invalid("expected YYYY-YYYY"))?;

        let start_year = parse_year(start).ok_or_else(|| invalid("expected YYYY-YYYY"))?;
        let end_year = parse_year(end).ok_or_else(|| invalid("expected YYYY-YYYY"))?;

        if u32::from(end_year) != u32::from(start_year) + 1 {
            return Err(invalid("years must be consecutive"));
        }

        Ok(Self { start_year })
    }

    /// First calendar year of the season
    pub fn start_year(&self) -> u16 {
        self.start_year
    }

    /// Second calendar year of the season
    pub fn end_year(&self) -> u16 {
        self.start_year + 1
    }

    /// Canonical `YYYY-YYYY` form, as stored in the `season` column
    pub fn as_label(&self) -> String {
        format!("{:04}-{:04}", self.start_year, self.end_year())
    }
}

fn parse_year(s: &str) -> Option<u16> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:04}", self.start_year, self.end_year())
    }
}

impl FromStr for SeasonKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SeasonKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SeasonKey> for String {
    fn from(key: SeasonKey) -> Self {
        key.as_label()
    }
}
