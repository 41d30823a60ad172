//! The storage shape of a rule.
//!
//! A rule store persists `{startAt, tzOffsetSeconds, patternKind,
//! patternParams, boundsKind, boundsParams}`. [`RuleRecord`] is that tuple as
//! a serde type; converting back into a [`Rule`] re-validates every field, so a
//! record edited or corrupted at rest cannot produce a rule that misbehaves at
//! evaluation time.
//!
//! Weekdays are stored as 0 = Sunday .. 6 = Saturday.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bounds::{BoundsKind, BoundsPolicy};
use crate::calendar_day::{weekday_from_index, weekday_index};
use crate::error::{RecurrenceError, Result};
use crate::pattern::{PatternKind, RecurrencePattern};
use crate::rule::Rule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRecord {
    pub start_at: DateTime<Utc>,
    pub tz_offset_seconds: i32,
    pub pattern_kind: PatternKind,
    #[serde(default)]
    pub pattern_params: PatternParams,
    pub bounds_kind: BoundsKind,
    #[serde(default)]
    pub bounds_params: BoundsParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_index: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl From<&Rule> for RuleRecord {
    fn from(rule: &Rule) -> Self {
        let pattern_params = match *rule.pattern() {
            RecurrencePattern::Simple { interval_days } => PatternParams {
                interval_days: Some(interval_days.get()),
                ..PatternParams::default()
            },
            RecurrencePattern::WeeklyOnWeekday { weekday } => PatternParams {
                weekday: Some(weekday_index(weekday)),
                ..PatternParams::default()
            },
            RecurrencePattern::MonthlyNthWeekday {
                weekday,
                occurrence_index,
            } => PatternParams {
                weekday: Some(weekday_index(weekday)),
                occurrence_index: Some(occurrence_index.get()),
                interval_days: None,
            },
        };
        let bounds_params = match *rule.bounds() {
            BoundsPolicy::Unbounded => BoundsParams::default(),
            BoundsPolicy::EndsAt(end_at) => BoundsParams {
                end_at: Some(end_at),
                count: None,
            },
            BoundsPolicy::EndsAfter(count) => BoundsParams {
                end_at: None,
                count: Some(count.get()),
            },
        };

        RuleRecord {
            start_at: rule.start_at(),
            tz_offset_seconds: rule.tz_offset_seconds(),
            pattern_kind: rule.kind(),
            pattern_params,
            bounds_kind: rule.bounds().kind(),
            bounds_params,
        }
    }
}

impl From<Rule> for RuleRecord {
    fn from(rule: Rule) -> Self {
        RuleRecord::from(&rule)
    }
}

impl TryFrom<&RuleRecord> for Rule {
    type Error = RecurrenceError;

    fn try_from(record: &RuleRecord) -> Result<Self> {
        let params = &record.pattern_params;
        let pattern = match record.pattern_kind {
            PatternKind::Simple => {
                RecurrencePattern::simple(require(params.interval_days, "intervalDays")?)?
            }
            PatternKind::WeeklyWeekday => {
                RecurrencePattern::weekly(weekday_from_index(require(params.weekday, "weekday")?)?)
            }
            PatternKind::MonthlyNthWeekday => RecurrencePattern::monthly_nth(
                require(params.occurrence_index, "occurrenceIndex")?,
                weekday_from_index(require(params.weekday, "weekday")?)?,
            )?,
        };
        let bounds = match record.bounds_kind {
            BoundsKind::Unbounded => BoundsPolicy::Unbounded,
            BoundsKind::EndsAt => {
                BoundsPolicy::EndsAt(require(record.bounds_params.end_at, "endAt")?)
            }
            BoundsKind::EndsAfter => {
                BoundsPolicy::ends_after(require(record.bounds_params.count, "count")?)?
            }
        };
        Rule::new(record.start_at, record.tz_offset_seconds, pattern, bounds)
    }
}

impl TryFrom<RuleRecord> for Rule {
    type Error = RecurrenceError;

    fn try_from(record: RuleRecord) -> Result<Self> {
        Rule::try_from(&record)
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| RecurrenceError::InvalidParameter(format!("missing {}", field)))
}

/// Decode rules from JSON: a single record or an array of records.
///
/// Parse errors name the offending field and its position.
pub fn rules_from_json(json: &str) -> Result<Vec<Rule>> {
    let records: Vec<RuleRecord> = if json.trim_start().starts_with('[') {
        serde_json::from_str(json)?
    } else {
        vec![serde_json::from_str(json)?]
    };
    records.iter().map(Rule::try_from).collect()
}

/// Encode rules as a JSON array of records.
pub fn rules_to_json(rules: &[Rule]) -> Result<String> {
    let records: Vec<RuleRecord> = rules.iter().map(RuleRecord::from).collect();
    Ok(serde_json::to_string(&records)?)
}
