//! RFC 5545 rendering of rules.
//!
//! Rules carry a fixed offset rather than an IANA zone, so the rendered
//! `DTSTART` and `UNTIL` are the rule's *local* wall-clock times labelled as
//! UTC. [`expand_with_rrule`] undoes that shift after expansion.

use chrono::{DateTime, TimeDelta, Utc, Weekday};
use rrule::RRuleSet;

use crate::bounds::BoundsPolicy;
use crate::error::{RecurrenceError, Result};
use crate::pattern::RecurrencePattern;
use crate::rule::Rule;

/// Render `rule` as an iCalendar `DTSTART` + `RRULE` block.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use recurrence_engine::{to_rrule_text, RuleBuilder};
///
/// let start = Utc.with_ymd_and_hms(2023, 4, 15, 0, 0, 0).unwrap();
/// let rule = RuleBuilder::new()
///     .with_simple_interval(5)
///     .unwrap()
///     .build(start, 0)
///     .unwrap()[0];
/// assert_eq!(
///     to_rrule_text(&rule).unwrap(),
///     "DTSTART;TZID=UTC:20230415T000000\nRRULE:FREQ=DAILY;INTERVAL=5"
/// );
/// ```
///
/// # Errors
/// Returns `RecurrenceError::Rfc5545` if the local start falls outside the
/// representable calendar, or for a simple interval above 65535 days (the
/// largest `INTERVAL` the `rrule` crate accepts).
pub fn to_rrule_text(rule: &Rule) -> Result<String> {
    let offset = TimeDelta::seconds(i64::from(rule.tz_offset_seconds()));
    let local_start = rule
        .start_at()
        .naive_utc()
        .checked_add_signed(offset)
        .ok_or_else(|| RecurrenceError::Rfc5545("start out of range".to_string()))?;

    let mut parts = vec![match *rule.pattern() {
        RecurrencePattern::Simple { interval_days } => {
            if interval_days.get() > u32::from(u16::MAX) {
                return Err(RecurrenceError::Rfc5545(format!(
                    "interval of {} days exceeds the RRULE INTERVAL limit of {}",
                    interval_days,
                    u16::MAX
                )));
            }
            format!("FREQ=DAILY;INTERVAL={}", interval_days)
        }
        RecurrencePattern::WeeklyOnWeekday { weekday } => {
            format!("FREQ=WEEKLY;BYDAY={}", byday(weekday))
        }
        RecurrencePattern::MonthlyNthWeekday {
            weekday,
            occurrence_index,
        } => format!(
            "FREQ=MONTHLY;BYDAY={};BYSETPOS={}",
            byday(weekday),
            occurrence_index.get()
        ),
    }];

    match rule.bounds() {
        BoundsPolicy::Unbounded => {}
        BoundsPolicy::EndsAt(_) => {
            if let Some(end_day) = rule.end_day() {
                // Inclusive through the end of the local end day.
                parts.push(format!("UNTIL={}T235959Z", end_day.date().format("%Y%m%d")));
            }
        }
        BoundsPolicy::EndsAfter(count) => parts.push(format!("COUNT={}", count)),
    }

    Ok(format!(
        "DTSTART;TZID=UTC:{}\nRRULE:{}",
        local_start.format("%Y%m%dT%H%M%S"),
        parts.join(";")
    ))
}

/// Expand `rule` through the `rrule` crate, returning at most `limit` instants.
///
/// Produces the same instants as [`enumerate`](crate::enumerate) for every
/// rule [`to_rrule_text`] can render, and exists to hand rules to RFC 5545
/// consumers and to cross-check the native search.
///
/// # Errors
/// Whatever [`to_rrule_text`] rejects, or `RecurrenceError::Rfc5545` if the
/// `rrule` crate refuses the rendered text.
pub fn expand_with_rrule(rule: &Rule, limit: u16) -> Result<Vec<DateTime<Utc>>> {
    // An end day before the start day admits nothing, but `rrule` rejects an
    // UNTIL earlier than DTSTART.
    if rule.end_day().is_some_and(|end| end < rule.start_day()) {
        return Ok(Vec::new());
    }
    let text = to_rrule_text(rule)?;
    let rrule_set: RRuleSet = text
        .parse()
        .map_err(|e| RecurrenceError::Rfc5545(format!("{}", e)))?;

    let offset = TimeDelta::seconds(i64::from(rule.tz_offset_seconds()));
    Ok(rrule_set
        .all(limit)
        .dates
        .into_iter()
        .filter_map(|dt| dt.with_timezone(&Utc).checked_sub_signed(offset))
        .collect())
}

fn byday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
