//! Termination policies for a rule.

use std::fmt;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar_day::{to_calendar_day, CalendarDay};
use crate::error::{RecurrenceError, Result};
use crate::pattern::RecurrencePattern;

/// How a rule terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoundsPolicy {
    #[default]
    Unbounded,
    /// Last admissible day is the local calendar day of this instant (inclusive).
    EndsAt(DateTime<Utc>),
    /// Only the first `count` occurrences are admitted.
    EndsAfter(NonZeroU32),
}

/// Discriminant of [`BoundsPolicy`], as stored by a rule store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundsKind {
    Unbounded,
    EndsAt,
    EndsAfter,
}

impl fmt::Display for BoundsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundsKind::Unbounded => "unbounded",
            BoundsKind::EndsAt => "endsAt",
            BoundsKind::EndsAfter => "endsAfter",
        };
        f.write_str(name)
    }
}

impl BoundsPolicy {
    pub fn ends_after(count: u32) -> Result<Self> {
        NonZeroU32::new(count)
            .map(BoundsPolicy::EndsAfter)
            .ok_or_else(|| {
                RecurrenceError::InvalidParameter(
                    "occurrence count must be at least 1".to_string(),
                )
            })
    }

    pub fn kind(&self) -> BoundsKind {
        match self {
            BoundsPolicy::Unbounded => BoundsKind::Unbounded,
            BoundsPolicy::EndsAt(_) => BoundsKind::EndsAt,
            BoundsPolicy::EndsAfter(_) => BoundsKind::EndsAfter,
        }
    }

    /// Last admissible calendar day for `EndsAt`; `None` otherwise.
    pub fn end_day(&self, tz_offset_seconds: i32) -> Option<CalendarDay> {
        match self {
            BoundsPolicy::EndsAt(end) => Some(to_calendar_day(*end, tz_offset_seconds)),
            _ => None,
        }
    }

    /// Whether an occurrence on `candidate` is admitted by these bounds.
    ///
    /// `candidate` is assumed to already match `pattern`. For `EndsAfter`,
    /// `occurrence_index` is its 0-based position; when the caller does not
    /// know it, it is counted from `start`.
    pub fn within_bounds(
        &self,
        pattern: &RecurrencePattern,
        start: CalendarDay,
        candidate: CalendarDay,
        tz_offset_seconds: i32,
        occurrence_index: Option<u64>,
    ) -> bool {
        match self {
            BoundsPolicy::Unbounded => true,
            BoundsPolicy::EndsAt(end) => candidate <= to_calendar_day(*end, tz_offset_seconds),
            BoundsPolicy::EndsAfter(count) => {
                let index = occurrence_index
                    .unwrap_or_else(|| pattern.occurrence_index(start, candidate));
                index < u64::from(count.get())
            }
        }
    }
}
