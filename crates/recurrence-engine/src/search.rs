//! Occurrence queries against a single rule.
//!
//! All queries work at calendar-day granularity in the rule's own offset, then
//! map the resulting day back to an instant that keeps the rule's authoring
//! time of day. Searches are incremental: nothing here materializes a range.

use std::iter::FusedIterator;

use chrono::{DateTime, Utc};

use crate::bounds::BoundsPolicy;
use crate::calendar_day::CalendarDay;
use crate::rule::Rule;

/// Whether `rule` has an occurrence on the local calendar day of `instant`.
pub fn occurs_on(rule: &Rule, instant: DateTime<Utc>) -> bool {
    let day = rule.calendar_day(instant);
    let start = rule.start_day();
    rule.pattern().matches(day, start)
        && rule
            .bounds()
            .within_bounds(rule.pattern(), start, day, rule.tz_offset_seconds(), None)
}

/// Whether `rule` has an occurrence on any local day from `from` through `to`
/// (both inclusive). An inverted range contains nothing.
pub fn occurs_between(rule: &Rule, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    if from > to {
        return false;
    }
    let from_day = rule.calendar_day(from);
    let to_day = rule.calendar_day(to);
    next_occurrence_day(rule, from_day - 1, None).is_some_and(|day| day <= to_day)
}

/// The first occurrence on a local day strictly after the day of `after`.
///
/// Returns `None` once the rule's bounds are exhausted.
pub fn next_occurrence(rule: &Rule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    next_occurrence_day(rule, rule.calendar_day(after), None)
        .and_then(|day| rule.occurrence_instant(day))
}

/// Day-level core of [`next_occurrence`].
///
/// `known_index` is the 0-based position the next occurrence will have, when
/// the caller is walking the sequence from the start and already knows it.
pub(crate) fn next_occurrence_day(
    rule: &Rule,
    after: CalendarDay,
    known_index: Option<u64>,
) -> Option<CalendarDay> {
    if rule.end_day().is_some_and(|end| after >= end) {
        return None;
    }
    let start = rule.start_day();
    let candidate = rule.pattern().next_after(start, after)?;
    rule.bounds()
        .within_bounds(
            rule.pattern(),
            start,
            candidate,
            rule.tz_offset_seconds(),
            known_index,
        )
        .then_some(candidate)
}

/// Lazily enumerate every occurrence of `rule` in ascending order.
///
/// The sequence is infinite for unbounded rules; callers bound consumption
/// (e.g. with `take`). Each call starts from scratch, so enumerating twice
/// yields identical sequences.
pub fn enumerate(rule: &Rule) -> Occurrences {
    Occurrences {
        rule: *rule,
        cursor: rule.start_day() - 1,
        known_index: Some(0),
        until: None,
        done: false,
    }
}

/// Lazily enumerate the occurrences on local days from `from` through `to`.
pub fn occurrences_between(rule: &Rule, from: DateTime<Utc>, to: DateTime<Utc>) -> Occurrences {
    let from_day = rule.calendar_day(from);
    Occurrences {
        rule: *rule,
        cursor: from_day - 1,
        known_index: None,
        until: Some(rule.calendar_day(to)),
        done: from > to,
    }
}

/// The final occurrence of a bounded rule.
///
/// `None` for unbounded rules and for bounds that admit no occurrence at all
/// (an end date before the first match).
pub fn last_occurrence(rule: &Rule) -> Option<DateTime<Utc>> {
    last_occurrence_day(rule).and_then(|day| rule.occurrence_instant(day))
}

fn last_occurrence_day(rule: &Rule) -> Option<CalendarDay> {
    let start = rule.start_day();
    match rule.bounds() {
        BoundsPolicy::Unbounded => None,
        BoundsPolicy::EndsAt(_) => {
            let end = rule.end_day()?;
            rule.pattern().last_on_or_before(start, end)
        }
        BoundsPolicy::EndsAfter(count) => rule
            .pattern()
            .nth_occurrence(start, u64::from(count.get()) - 1),
    }
}

/// Whether the rule's active period covers the local day of `instant`.
///
/// The period runs from the start day through the end day (`EndsAt`) or the
/// last occurrence (`EndsAfter`), regardless of whether the pattern itself
/// matches that day.
pub fn is_active_on(rule: &Rule, instant: DateTime<Utc>) -> bool {
    let day = rule.calendar_day(instant);
    if day < rule.start_day() {
        return false;
    }
    match rule.bounds() {
        BoundsPolicy::Unbounded => true,
        BoundsPolicy::EndsAt(_) => rule.end_day().is_some_and(|end| day <= end),
        BoundsPolicy::EndsAfter(count) => {
            let count = u64::from(count.get());
            match rule.pattern().last_on_or_before(rule.start_day(), day) {
                // The first occurrence is still ahead.
                None => true,
                Some(latest) => {
                    let position = rule.pattern().occurrence_index(rule.start_day(), latest) + 1;
                    position < count || (position == count && latest == day)
                }
            }
        }
    }
}

/// Lazy occurrence sequence produced by [`enumerate`] and [`occurrences_between`].
///
/// Computes one occurrence per `next` call and holds no reference to the rule.
#[derive(Debug, Clone)]
pub struct Occurrences {
    rule: Rule,
    /// Last day already consumed (or the day before the seed).
    cursor: CalendarDay,
    /// Position of the next occurrence when seeded from the start day.
    known_index: Option<u64>,
    until: Option<CalendarDay>,
    done: bool,
}

impl Occurrences {
    /// The rule being enumerated.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }
}

impl Iterator for Occurrences {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = next_occurrence_day(&self.rule, self.cursor, self.known_index)
            .filter(|day| self.until.is_none_or(|until| *day <= until))
            .and_then(|day| self.rule.occurrence_instant(day).map(|instant| (day, instant)));

        match next {
            Some((day, instant)) => {
                self.cursor = day;
                self.known_index = self.known_index.map(|i| i + 1);
                Some(instant)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl FusedIterator for Occurrences {}
