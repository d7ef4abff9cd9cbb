//! Countdown target parsing and remaining-time decomposition
//!
//! Remaining time is truncated to whole seconds. A target less than one
//! second away counts as passed.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use super::timezone::DisplayTimezone;

/// Why a countdown target could not be turned into an instant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountdownError {
    #[error("no countdown target given")]
    Missing,

    #[error("cannot parse countdown target '{0}'")]
    Unparseable(String),

    #[error("countdown target '{0}' does not exist in the display timezone")]
    NonexistentLocalTime(String),
}

/// Formats carrying their own offset, tried after RFC 3339
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

/// Wall-clock formats interpreted in the display timezone
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO 8601 countdown target
///
/// A trailing `Z` or an explicit offset pins the instant. Naive
/// timestamps and bare dates (midnight) are read in `tz`.
pub fn parse_target(
    input: Option<&str>,
    tz: &DisplayTimezone,
) -> Result<DateTime<FixedOffset>, CountdownError> {
    let raw = input.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(CountdownError::Missing);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }

    // Accept a space as date/time separator and `Z` as UTC
    let mut normalized = raw.replacen(' ', "T", 1);
    if normalized.ends_with('Z') || normalized.ends_with('z') {
        normalized.pop();
        normalized.push_str("+00:00");
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt);
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| CountdownError::Unparseable(raw.to_string()))?;

    tz.localize(naive)
        .ok_or_else(|| CountdownError::NonexistentLocalTime(raw.to_string()))
}

/// Time left until a countdown target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub days: i64,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Remaining {
    /// Decompose a positive number of seconds into days/hours/minutes/seconds
    pub fn from_seconds(total: i64) -> Option<Self> {
        if total <= 0 {
            return None;
        }
        let days = total / 86_400;
        let rest = total % 86_400;
        Some(Self {
            days,
            hours: (rest / 3600) as u32,
            minutes: (rest % 3600 / 60) as u32,
            seconds: (rest % 60) as u32,
        })
    }

    /// Time left from `now` until `target`, `None` once the target is reached
    pub fn until(target: DateTime<FixedOffset>, now: DateTime<Utc>) -> Option<Self> {
        let delta = target.with_timezone(&Utc) - now;
        Self::from_seconds(delta.num_seconds())
    }

    /// Days for display, `None` when less than a day remains
    pub fn display_days(&self) -> Option<i64> {
        (self.days > 0).then_some(self.days)
    }
}
