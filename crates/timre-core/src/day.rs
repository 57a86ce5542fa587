//! Calendar-day identifiers and the shifted "effective day".
//!
//! All rollover and streak bookkeeping happens in effective days: a wall-clock
//! time before the boundary hour still belongs to the previous calendar day.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Default hour at which a new effective day begins.
pub const DAY_BOUNDARY_HOUR: u32 = 3;

const CANONICAL_FORMAT: &str = "%Y-%m-%d";
/// Written by older installs, e.g. `Fri Oct 16 2026`.
const LEGACY_FORMAT: &str = "%a %b %d %Y";

/// A calendar day, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayId(NaiveDate);

impl DayId {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The day before. Saturates at the minimum representable date.
    pub fn pred(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// The day after. Saturates at the maximum representable date.
    pub fn succ(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    /// `n` days earlier.
    pub fn days_before(&self, n: u64) -> Self {
        Self(
            self.0
                .checked_sub_days(chrono::Days::new(n))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: &DayId) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for DayId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, CANONICAL_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(s, LEGACY_FORMAT))
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate(s.to_string()))
    }
}

impl Serialize for DayId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Effective calendar day for `now` given the boundary hour.
pub fn effective_day(now: NaiveDateTime, boundary_hour: u32) -> DayId {
    let day = DayId(now.date());
    if now.hour() < boundary_hour {
        day.pred()
    } else {
        day
    }
}
