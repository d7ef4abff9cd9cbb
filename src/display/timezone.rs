//! Display timezone handling
//!
//! Timestamps written into the display state and naive countdown targets
//! are interpreted in one configurable zone. `local` follows the host zone
//! including daylight-saving transitions.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Zone used for `updated` stamps and naive countdown targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DisplayTimezone {
    /// Host local time
    #[default]
    Local,
    Utc,
    /// Fixed offset from UTC, no daylight saving
    Fixed(FixedOffset),
}

impl DisplayTimezone {
    /// Express a UTC instant in this zone
    pub fn to_zone(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            DisplayTimezone::Local => instant.with_timezone(&Local).fixed_offset(),
            DisplayTimezone::Utc => instant.fixed_offset(),
            DisplayTimezone::Fixed(offset) => instant.with_timezone(offset),
        }
    }

    /// Attach this zone to a wall-clock time
    ///
    /// Returns `None` for local times skipped by a DST transition. Ambiguous
    /// local times resolve to the earlier instant.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            DisplayTimezone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            DisplayTimezone::Utc => Some(Utc.from_utc_datetime(&naive).fixed_offset()),
            DisplayTimezone::Fixed(offset) => offset.from_local_datetime(&naive).single(),
        }
    }
}

/// Error for timezone names that are neither `local`, `utc` nor an offset
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timezone '{0}' (expected \"local\", \"utc\" or an offset like \"+01:00\")")]
pub struct TimezoneParseError(pub String);

impl FromStr for DisplayTimezone {
    type Err = TimezoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(DisplayTimezone::Local),
            "utc" | "z" => return Ok(DisplayTimezone::Utc),
            _ => {}
        }

        parse_offset(trimmed)
            .map(DisplayTimezone::Fixed)
            .ok_or_else(|| TimezoneParseError(s.to_string()))
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM` or `+HH`
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };

    let (hh, mm) = match rest.len() {
        2 => (rest, "00"),
        4 => (rest.get(..2)?, rest.get(2..)?),
        5 if rest.as_bytes()[2] == b':' => (rest.get(..2)?, rest.get(3..)?),
        _ => return None,
    };
    if !hh.bytes().chain(mm.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hh.parse().ok()?;
    let minutes: i32 = mm.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl TryFrom<String> for DisplayTimezone {
    type Error = TimezoneParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DisplayTimezone> for String {
    fn from(tz: DisplayTimezone) -> Self {
        tz.to_string()
    }
}

impl std::fmt::Display for DisplayTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayTimezone::Local => f.write_str("local"),
            DisplayTimezone::Utc => f.write_str("utc"),
            DisplayTimezone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_names() {
        assert_eq!("local".parse::<DisplayTimezone>().unwrap(), DisplayTimezone::Local);
        assert_eq!("UTC".parse::<DisplayTimezone>().unwrap(), DisplayTimezone::Utc);
        assert_eq!("Z".parse::<DisplayTimezone>().unwrap(), DisplayTimezone::Utc);
    }

    #[test]
    fn test_parse_offsets() {
        let tz: DisplayTimezone = "+01:00".parse().unwrap();
        assert_eq!(tz, DisplayTimezone::Fixed(FixedOffset::east_opt(3600).unwrap()));
        let tz: DisplayTimezone = "-0530".parse().unwrap();
        assert_eq!(tz, DisplayTimezone::Fixed(FixedOffset::west_opt(5 * 3600 + 1800).unwrap()));
        let tz: DisplayTimezone = "+09".parse().unwrap();
        assert_eq!(tz, DisplayTimezone::Fixed(FixedOffset::east_opt(9 * 3600).unwrap()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("Europe/Paris".parse::<DisplayTimezone>().is_err());
        assert!("+25:00".parse::<DisplayTimezone>().is_err());
        assert!("+1:0".parse::<DisplayTimezone>().is_err());
        assert!("".parse::<DisplayTimezone>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_config() {
        let tz: DisplayTimezone = serde_yaml::from_str("\"-08:00\"").unwrap();
        assert_eq!(tz.to_string(), "-08:00");
        let tz: DisplayTimezone = serde_yaml::from_str("utc").unwrap();
        assert_eq!(tz, DisplayTimezone::Utc);
    }

    #[test]
    fn test_localize_fixed_offset() {
        let tz = DisplayTimezone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap());
        let naive = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let dt = tz.localize(naive).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-15T10:00:00+02:00");
    }

    #[test]
    fn test_to_zone_keeps_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let tz = DisplayTimezone::Fixed(FixedOffset::west_opt(4 * 3600).unwrap());
        let zoned = tz.to_zone(instant);
        assert_eq!(zoned.to_rfc3339(), "2025-06-01T08:00:00-04:00");
        assert_eq!(zoned.with_timezone(&Utc), instant);
    }
}
