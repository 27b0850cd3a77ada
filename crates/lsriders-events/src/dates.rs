//! Calendar-date thresholds and timestamp normalization.
//!
//! Date filters take a `yyyy-MM-dd` string. The day is turned into the instant
//! its first moment occurs in the configured [`DateZone`], and events are
//! compared against that instant.

use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, LocalResult, NaiveDate, NaiveTime, SubsecRound,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::errors::{EventStoreError, Result};

/// Format accepted for date thresholds.
pub const THRESHOLD_FORMAT: &str = "%Y-%m-%d";

/// Zone in which a calendar date is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateZone {
    /// The system's local zone.
    Local,
    /// A fixed IANA zone.
    Named(Tz),
}

impl DateZone {
    /// Parse `"local"` or an IANA zone name such as `"Europe/Madrid"`.
    pub fn parse(name: &str) -> Result<Self> {
        if name.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        Tz::from_str(name)
            .map(Self::Named)
            .map_err(|_| EventStoreError::InvalidConfig(format!("unknown time zone: {name}")))
    }

    /// First instant of `date` in this zone.
    pub fn start_of_day(self, date: NaiveDate) -> DateTime<Utc> {
        match self {
            Self::Local => first_instant(&Local, date),
            Self::Named(tz) => first_instant(&tz, date),
        }
    }
}

/// Resolve the earliest existing local time on `date`, walking forward past a
/// DST gap at midnight.
fn first_instant<Z: TimeZone>(zone: &Z, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    let mut candidate = midnight;
    // Real-world gaps are at most a couple of hours.
    for _ in 0..=(24 * 4) {
        match zone.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += chrono::Duration::minutes(15),
        }
    }
    Utc.from_utc_datetime(&midnight)
}

/// Exactly `yyyy-MM-dd`: four-digit year, two-digit month and day, no sign
/// or surrounding whitespace. chrono's `%Y-%m-%d` alone is more lenient.
fn has_threshold_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a `yyyy-MM-dd` threshold into the start-of-day instant in `zone`.
pub fn parse_threshold(value: &str, zone: DateZone) -> Result<DateTime<Utc>> {
    if !has_threshold_shape(value) {
        return Err(EventStoreError::InvalidArgument(format!(
            "date must be formatted as yyyy-MM-dd, got {value:?}"
        )));
    }
    let date = NaiveDate::parse_from_str(value, THRESHOLD_FORMAT).map_err(|e| {
        EventStoreError::InvalidArgument(format!(
            "date must be formatted as yyyy-MM-dd, got {value:?}: {e}"
        ))
    })?;
    Ok(zone.start_of_day(date))
}

/// Years an event date may fall in. RFC 3339 text outside four digits
/// (`+10000-...`, `-0001-...`) cannot be read back from storage.
pub const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

/// Reject dates whose year, as written in their own offset, is outside
/// [`STORABLE_YEARS`].
pub fn ensure_storable(date: &DateTime<FixedOffset>) -> Result<()> {
    if STORABLE_YEARS.contains(&date.year()) {
        Ok(())
    } else {
        Err(EventStoreError::InvalidArgument(format!(
            "date year must be between 0000 and 9999, got {}",
            date.year()
        )))
    }
}

/// Truncate a timestamp to the precision the store keeps (microseconds).
pub fn normalize_timestamp(date: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    date.trunc_subsecs(6)
}

/// Comparable representation of an event date (microseconds since the epoch).
pub fn epoch_micros(date: &DateTime<FixedOffset>) -> i64 {
    date.timestamp_micros()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
