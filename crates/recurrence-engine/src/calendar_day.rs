//! Day-granularity calendar arithmetic.
//!
//! A [`CalendarDay`] is the number of whole days since 1970-01-01 in the rule
//! author's local time. An instant is shifted by a fixed timezone offset before
//! it is truncated, so "day" always means the local calendar date, never the
//! UTC date of the raw instant.

use std::ops::{Add, Sub};

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, Result};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// A local calendar date, stored as a day count since 1970-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDay(pub i64);

/// Normalize an instant into the local calendar day under `tz_offset_seconds`.
///
/// Uses floor division, so instants before the epoch (or pushed before it by a
/// negative offset) land on the correct preceding day.
pub fn to_calendar_day(instant: DateTime<Utc>, tz_offset_seconds: i32) -> CalendarDay {
    let local_seconds = instant.timestamp() + i64::from(tz_offset_seconds);
    CalendarDay(local_seconds.div_euclid(SECONDS_PER_DAY))
}

impl CalendarDay {
    pub fn from_date(date: NaiveDate) -> Self {
        CalendarDay(i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE)
    }

    /// The first day of the given month, if the month is representable.
    pub fn first_of_month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::from_date)
    }

    /// The proleptic Gregorian date for this day.
    ///
    /// Saturates at chrono's supported range; no instant a `DateTime<Utc>` can
    /// hold maps outside of it.
    pub fn date(self) -> NaiveDate {
        i32::try_from(self.0 + UNIX_EPOCH_DAYS_FROM_CE)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .unwrap_or(if self.0 < 0 {
                NaiveDate::MIN
            } else {
                NaiveDate::MAX
            })
    }

    /// Weekday of this day. 1970-01-01 was a Thursday.
    pub fn weekday(self) -> Weekday {
        match (self.0 + 4).rem_euclid(7) {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }

    pub fn year_month(self) -> (i32, u32) {
        let date = self.date();
        (date.year(), date.month())
    }
}

impl Add<i64> for CalendarDay {
    type Output = CalendarDay;

    fn add(self, days: i64) -> CalendarDay {
        CalendarDay(self.0 + days)
    }
}

impl Sub<i64> for CalendarDay {
    type Output = CalendarDay;

    fn sub(self, days: i64) -> CalendarDay {
        CalendarDay(self.0 - days)
    }
}

impl Sub for CalendarDay {
    type Output = i64;

    fn sub(self, other: CalendarDay) -> i64 {
        self.0 - other.0
    }
}

/// The (year, month) following the given one.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// The (year, month) preceding the given one.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// The `n`-th (1-based) `weekday` of a month, counted from the 1st.
///
/// Returns `None` when the month has fewer than `n` such weekdays.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<CalendarDay> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n).map(CalendarDay::from_date)
}

// ---------------------------------------------------------------------------
// Weekday index encoding (0 = Sunday .. 6 = Saturday)
// ---------------------------------------------------------------------------

/// Decode a weekday stored as 0 = Sunday .. 6 = Saturday.
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(RecurrenceError::InvalidParameter(format!(
            "weekday must be in 0..=6 (0 = Sunday), got {}",
            other
        ))),
    }
}

/// Encode a weekday as 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

// ---------------------------------------------------------------------------
// Offsets and instant parsing
// ---------------------------------------------------------------------------

/// Check that an offset is a valid fixed UTC offset (strictly within one day).
pub fn validate_tz_offset(tz_offset_seconds: i32) -> Result<i32> {
    FixedOffset::east_opt(tz_offset_seconds)
        .map(|_| tz_offset_seconds)
        .ok_or_else(|| {
            RecurrenceError::InvalidParameter(format!(
                "timezone offset must be within ±86399 seconds, got {}",
                tz_offset_seconds
            ))
        })
}

/// Resolve an IANA timezone to the fixed offset it has at `instant`.
///
/// Rules carry a fixed offset, so a zone with DST resolves differently
/// depending on which side of the transition the authoring instant falls.
pub fn tz_offset_at(timezone: &str, instant: DateTime<Utc>) -> Result<i32> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| RecurrenceError::InvalidTimezone(timezone.to_string()))?;
    Ok(tz
        .offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc())
}

/// Parse an instant from text.
///
/// Accepts RFC 3339 (`2023-04-15T09:00:00+04:00`), a naive datetime
/// (`2023-04-15T09:00:00`, read as UTC) or a bare date (`2023-04-15`, UTC
/// midnight).
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
        .ok_or_else(|| RecurrenceError::InvalidDateTime(s.to_string()))
}
