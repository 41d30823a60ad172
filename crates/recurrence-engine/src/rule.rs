//! A finalized recurrence rule.

use chrono::{DateTime, TimeDelta, Utc};

use crate::bounds::BoundsPolicy;
use crate::calendar_day::{to_calendar_day, validate_tz_offset, CalendarDay};
use crate::error::Result;
use crate::pattern::{PatternKind, RecurrencePattern};

/// One pattern, its bounds, and the local frame it is evaluated in.
///
/// Rules are immutable values: build a new one instead of editing it. They are
/// `Copy` and hold no interior state, so any number of threads may evaluate the
/// same rule at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    start_at: DateTime<Utc>,
    tz_offset_seconds: i32,
    pattern: RecurrencePattern,
    bounds: BoundsPolicy,
}

impl Rule {
    /// Create a rule from already-validated parts.
    ///
    /// # Errors
    /// Returns `RecurrenceError::InvalidParameter` if the offset is not within
    /// ±86399 seconds.
    pub fn new(
        start_at: DateTime<Utc>,
        tz_offset_seconds: i32,
        pattern: RecurrencePattern,
        bounds: BoundsPolicy,
    ) -> Result<Self> {
        validate_tz_offset(tz_offset_seconds)?;
        Ok(Rule {
            start_at,
            tz_offset_seconds,
            pattern,
            bounds,
        })
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    pub fn tz_offset_seconds(&self) -> i32 {
        self.tz_offset_seconds
    }

    pub fn pattern(&self) -> &RecurrencePattern {
        &self.pattern
    }

    pub fn bounds(&self) -> &BoundsPolicy {
        &self.bounds
    }

    pub fn kind(&self) -> PatternKind {
        self.pattern.kind()
    }

    /// The local calendar day of `instant` in this rule's offset.
    pub fn calendar_day(&self, instant: DateTime<Utc>) -> CalendarDay {
        to_calendar_day(instant, self.tz_offset_seconds)
    }

    pub fn start_day(&self) -> CalendarDay {
        self.calendar_day(self.start_at)
    }

    /// Last admissible day of an `EndsAt` rule.
    pub fn end_day(&self) -> Option<CalendarDay> {
        self.bounds.end_day(self.tz_offset_seconds)
    }

    /// The instant of the occurrence on `day`: `start_at` moved by whole days,
    /// keeping the authoring time of day.
    pub fn occurrence_instant(&self, day: CalendarDay) -> Option<DateTime<Utc>> {
        TimeDelta::try_days(day - self.start_day())
            .and_then(|delta| self.start_at.checked_add_signed(delta))
    }
}
