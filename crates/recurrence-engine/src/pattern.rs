//! Recurrence patterns and the single-cycle day-membership predicate.
//!
//! A pattern only knows *which days* repeat; termination lives in
//! [`BoundsPolicy`](crate::BoundsPolicy). Every computation here is relative to
//! the rule's start day, and no pattern ever yields a day before it.

use std::fmt;
use std::num::NonZeroU32;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::calendar_day::{next_month, nth_weekday_of_month, previous_month, CalendarDay};
use crate::error::{RecurrenceError, Result};

/// Upper bound on months inspected while looking for an Nth weekday.
///
/// Any weekday occurs five times in some month of every 12 consecutive months,
/// so the scan only runs out near the edge of the representable calendar.
const MAX_MONTH_SCAN: usize = 24;

/// Which occurrence of a weekday within a month (1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekOfMonth(u8);

impl WeekOfMonth {
    pub fn new(index: u8) -> Result<Self> {
        if (1..=5).contains(&index) {
            Ok(WeekOfMonth(index))
        } else {
            Err(RecurrenceError::InvalidParameter(format!(
                "occurrence index must be in 1..=5, got {}",
                index
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for WeekOfMonth {
    type Error = RecurrenceError;

    fn try_from(index: u8) -> Result<Self> {
        WeekOfMonth::new(index)
    }
}

impl From<WeekOfMonth> for u8 {
    fn from(week: WeekOfMonth) -> u8 {
        week.0
    }
}

/// The repeating shape of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecurrencePattern {
    /// Every `interval_days` days from the start day.
    Simple { interval_days: NonZeroU32 },
    /// Every week on `weekday`.
    WeeklyOnWeekday { weekday: Weekday },
    /// The `occurrence_index`-th `weekday` of every month. Months without one
    /// are skipped.
    MonthlyNthWeekday {
        weekday: Weekday,
        occurrence_index: WeekOfMonth,
    },
}

/// Discriminant of [`RecurrencePattern`], as stored by a rule store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    Simple,
    WeeklyWeekday,
    MonthlyNthWeekday,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternKind::Simple => "simple",
            PatternKind::WeeklyWeekday => "weeklyWeekday",
            PatternKind::MonthlyNthWeekday => "monthlyNthWeekday",
        };
        f.write_str(name)
    }
}

impl RecurrencePattern {
    pub fn simple(interval_days: u32) -> Result<Self> {
        let interval_days = NonZeroU32::new(interval_days).ok_or_else(|| {
            RecurrenceError::InvalidParameter("interval must be at least 1 day".to_string())
        })?;
        Ok(RecurrencePattern::Simple { interval_days })
    }

    pub fn weekly(weekday: Weekday) -> Self {
        RecurrencePattern::WeeklyOnWeekday { weekday }
    }

    pub fn monthly_nth(occurrence_index: u8, weekday: Weekday) -> Result<Self> {
        Ok(RecurrencePattern::MonthlyNthWeekday {
            weekday,
            occurrence_index: WeekOfMonth::new(occurrence_index)?,
        })
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            RecurrencePattern::Simple { .. } => PatternKind::Simple,
            RecurrencePattern::WeeklyOnWeekday { .. } => PatternKind::WeeklyWeekday,
            RecurrencePattern::MonthlyNthWeekday { .. } => PatternKind::MonthlyNthWeekday,
        }
    }

    /// Whether `candidate` is one of this pattern's days for a rule starting on `start`.
    pub fn matches(&self, candidate: CalendarDay, start: CalendarDay) -> bool {
        if candidate < start {
            return false;
        }
        match *self {
            RecurrencePattern::Simple { interval_days } => {
                (candidate - start) % i64::from(interval_days.get()) == 0
            }
            RecurrencePattern::WeeklyOnWeekday { weekday } => candidate.weekday() == weekday,
            RecurrencePattern::MonthlyNthWeekday {
                weekday,
                occurrence_index,
            } => {
                let (year, month) = candidate.year_month();
                nth_weekday_of_month(year, month, weekday, occurrence_index.get())
                    == Some(candidate)
            }
        }
    }

    /// The first pattern day strictly after `after`, never before `start`.
    ///
    /// `None` only when the search runs off the representable calendar.
    pub fn next_after(&self, start: CalendarDay, after: CalendarDay) -> Option<CalendarDay> {
        match *self {
            RecurrencePattern::Simple { interval_days } => {
                let n = i64::from(interval_days.get());
                let k = ((after - start).div_euclid(n) + 1).max(0);
                Some(start + k * n)
            }
            RecurrencePattern::WeeklyOnWeekday { weekday } => {
                let from = (after + 1).max(start);
                Some(from + days_until(from.weekday(), weekday))
            }
            RecurrencePattern::MonthlyNthWeekday {
                weekday,
                occurrence_index,
            } => {
                let from = (after + 1).max(start);
                let (mut year, mut month) = from.year_month();
                for _ in 0..MAX_MONTH_SCAN {
                    match nth_weekday_of_month(year, month, weekday, occurrence_index.get()) {
                        Some(day) if day >= from => return Some(day),
                        Some(_) => {}
                        None => tracing::trace!(
                            year,
                            month,
                            occurrence_index = occurrence_index.get(),
                            "month has no such weekday, skipping"
                        ),
                    }
                    (year, month) = next_month(year, month);
                }
                None
            }
        }
    }

    /// The last pattern day on or before `day`, never before `start`.
    pub fn last_on_or_before(&self, start: CalendarDay, day: CalendarDay) -> Option<CalendarDay> {
        if day < start {
            return None;
        }
        match *self {
            RecurrencePattern::Simple { interval_days } => {
                let n = i64::from(interval_days.get());
                Some(start + ((day - start) / n) * n)
            }
            RecurrencePattern::WeeklyOnWeekday { weekday } => {
                let candidate = day - days_until(weekday, day.weekday());
                (candidate >= start).then_some(candidate)
            }
            RecurrencePattern::MonthlyNthWeekday {
                weekday,
                occurrence_index,
            } => {
                let (mut year, mut month) = day.year_month();
                for _ in 0..MAX_MONTH_SCAN {
                    if let Some(candidate) =
                        nth_weekday_of_month(year, month, weekday, occurrence_index.get())
                    {
                        if candidate <= day {
                            return (candidate >= start).then_some(candidate);
                        }
                    }
                    (year, month) = previous_month(year, month);
                    if CalendarDay::first_of_month(year, month).is_some_and(|d| d < start - 31) {
                        return None;
                    }
                }
                None
            }
        }
    }

    /// Number of pattern days in `[start, candidate)`.
    ///
    /// When `candidate` is itself a pattern day this is its 0-based index.
    pub fn occurrence_index(&self, start: CalendarDay, candidate: CalendarDay) -> u64 {
        if candidate <= start {
            return 0;
        }
        let count = match *self {
            RecurrencePattern::Simple { interval_days } => {
                let n = i64::from(interval_days.get());
                (candidate - start + n - 1) / n
            }
            RecurrencePattern::WeeklyOnWeekday { weekday } => {
                let first = start + days_until(start.weekday(), weekday);
                if candidate <= first {
                    0
                } else {
                    (candidate - first + 6) / 7
                }
            }
            RecurrencePattern::MonthlyNthWeekday {
                weekday,
                occurrence_index,
            } => {
                let (mut year, mut month) = start.year_month();
                let last = candidate.year_month();
                let mut count = 0;
                loop {
                    if let Some(day) =
                        nth_weekday_of_month(year, month, weekday, occurrence_index.get())
                    {
                        if day >= start && day < candidate {
                            count += 1;
                        }
                    }
                    if (year, month) >= last {
                        break;
                    }
                    (year, month) = next_month(year, month);
                }
                count
            }
        };
        u64::try_from(count).unwrap_or(0)
    }

    /// The pattern day with 0-based position `index` counting from `start`.
    pub fn nth_occurrence(&self, start: CalendarDay, index: u64) -> Option<CalendarDay> {
        let index = i64::try_from(index).ok()?;
        match *self {
            RecurrencePattern::Simple { interval_days } => {
                let n = i64::from(interval_days.get());
                index.checked_mul(n).map(|offset| start + offset)
            }
            RecurrencePattern::WeeklyOnWeekday { weekday } => {
                let first = start + days_until(start.weekday(), weekday);
                index.checked_mul(7).map(|offset| first + offset)
            }
            RecurrencePattern::MonthlyNthWeekday { .. } => {
                let mut day = self.next_after(start, start - 1)?;
                for _ in 0..index {
                    day = self.next_after(start, day)?;
                }
                Some(day)
            }
        }
    }
}

/// Days to move forward from `from` to reach the next `to` (0 when equal).
fn days_until(from: Weekday, to: Weekday) -> i64 {
    (i64::from(to.num_days_from_sunday()) - i64::from(from.num_days_from_sunday())).rem_euclid(7)
}
