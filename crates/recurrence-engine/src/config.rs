//! Declarative rule configuration.
//!
//! [`RuleConfig`] is the JSON form of a [`RuleBuilder`] session, used by the
//! CLI and the language bindings. Fields are applied in a fixed order
//! (patterns, then start, then bounds) through the builder, so a config hits
//! exactly the same validation as hand-written builder calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::builder::RuleBuilder;
use crate::calendar_day::weekday_from_index;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleConfig {
    /// Repeat every N days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every_days: Option<u32>,
    /// Repeat weekly on these weekdays (0 = Sunday). `[]` means the start's weekday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_nth: Option<MonthlyNthConfig>,
    /// Overrides the host base date passed to `build`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_after: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MonthlyNthConfig {
    /// 1..=5
    pub index: u8,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
}

impl RuleConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replay this configuration onto a fresh [`RuleBuilder`].
    ///
    /// # Errors
    /// Any error the equivalent builder calls would return.
    pub fn to_builder(&self) -> Result<RuleBuilder> {
        let mut builder = RuleBuilder::new();

        if let Some(days) = self.every_days {
            builder = builder.with_simple_interval(days)?;
        }
        if let Some(indices) = &self.weekdays {
            let weekdays = indices
                .iter()
                .map(|index| weekday_from_index(*index))
                .collect::<Result<Vec<_>>>()?;
            builder = builder.with_weekdays(weekdays)?;
        }
        if let Some(nth) = self.monthly_nth {
            builder = builder.with_monthly_nth(nth.index, weekday_from_index(nth.weekday)?)?;
        }
        if let Some(start_at) = self.start_at {
            builder = builder.with_start_at(start_at);
        }
        if let Some(end) = self.ends_at {
            builder = builder.with_ends_at(end)?;
        }
        if let Some(count) = self.ends_after {
            builder = builder.with_ends_after(count)?;
        }

        Ok(builder)
    }
}
