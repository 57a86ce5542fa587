//! User settings consumed by the engine: bedtime, clock format, email.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Time the user goes to bed, stored as zero-padded 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bedtime(NaiveTime);

impl Bedtime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        s.parse()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// `22:00` in 24-hour mode, `10:00 PM` otherwise.
    pub fn display(&self, use_24_hour: bool) -> String {
        if use_24_hour {
            return self.to_string();
        }
        let (is_pm, hour) = self.0.hour12();
        let period = if is_pm { "PM" } else { "AM" };
        format!("{}:{:02} {}", hour, self.minute(), period)
    }

    /// Start of the evening review window on the calendar date of `now`.
    pub fn review_opens_at(&self, now: NaiveDateTime, window_hours: u32) -> NaiveDateTime {
        now.date().and_time(self.0) - Duration::hours(i64::from(window_hours))
    }
}

impl Default for Bedtime {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl fmt::Display for Bedtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for Bedtime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for Bedtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bedtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Persisted user preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub bedtime: Bedtime,
    pub use_24_hour_format: bool,
    pub user_email: String,
    pub onboarding_completed: bool,
}

impl Settings {
    pub fn formatted_bedtime(&self) -> String {
        self.bedtime.display(self.use_24_hour_format)
    }

    /// Whether `now` is at or past `bedtime - window_hours`.
    pub fn is_evening_review_window_open(&self, now: NaiveDateTime, window_hours: u32) -> bool {
        now >= self.bedtime.review_opens_at(now, window_hours)
    }
}
