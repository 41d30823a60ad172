//! Assemble [`Rule`]s from a high-level configuration.
//!
//! Configuration errors surface at the offending call: every configurator
//! consumes the builder and returns it only on success, so a rejected call
//! leaves no half-configured builder behind.
//!
//! ```rust
//! use chrono::{TimeZone, Utc, Weekday};
//! use recurrence_engine::RuleBuilder;
//!
//! let base = Utc.with_ymd_and_hms(2023, 4, 17, 9, 0, 0).unwrap();
//! let rules = RuleBuilder::new()
//!     .with_weekdays([Weekday::Wed, Weekday::Mon])
//!     .unwrap()
//!     .build(base, 0)
//!     .unwrap();
//! assert_eq!(rules.len(), 2);
//! ```

use std::mem;

use chrono::{DateTime, Utc, Weekday};

use crate::bounds::BoundsPolicy;
use crate::calendar_day::{to_calendar_day, validate_tz_offset};
use crate::error::{RecurrenceError, Result};
use crate::pattern::RecurrencePattern;
use crate::rule::Rule;

/// A host object that owns recurrences and supplies their default start.
pub trait Repeatable {
    /// The instant used as `start_at` unless the builder overrides it.
    fn repetition_base_date(&self) -> DateTime<Utc>;
}

/// The configurator that fixed the builder's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternShape {
    Simple(RecurrencePattern),
    /// Distinct weekdays in Sunday-first order. Empty means "the start's weekday".
    Weekdays(Vec<Weekday>),
    MonthlyNth(RecurrencePattern),
}

impl PatternShape {
    fn fans_out(&self) -> bool {
        matches!(self, PatternShape::Weekdays(days) if days.len() > 1)
    }

    fn name(&self) -> &'static str {
        match self {
            PatternShape::Simple(_) => "simple",
            PatternShape::Weekdays(_) => "weekdays",
            PatternShape::MonthlyNth(_) => "monthlyNth",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBuilder {
    pattern: Option<PatternShape>,
    bounds: BoundsPolicy,
    start_at: Option<DateTime<Utc>>,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repeat every `days` days.
    pub fn with_simple_interval(self, days: u32) -> Result<Self> {
        let pattern = RecurrencePattern::simple(days)?;
        self.with_shape(PatternShape::Simple(pattern))
    }

    /// Repeat every day.
    pub fn daily(self) -> Result<Self> {
        self.with_simple_interval(1)
    }

    /// Repeat every week on each of `weekdays`.
    ///
    /// Duplicates are dropped and the order is normalized to Sunday..Saturday.
    /// An empty set repeats on the weekday of the start date.
    pub fn with_weekdays<I>(self, weekdays: I) -> Result<Self>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut days: Vec<Weekday> = weekdays.into_iter().collect();
        days.sort_by_key(|day| day.num_days_from_sunday());
        days.dedup();
        self.with_shape(PatternShape::Weekdays(days))
    }

    /// Repeat on the `index`-th (1..=5) `weekday` of every month.
    pub fn with_monthly_nth(self, index: u8, weekday: Weekday) -> Result<Self> {
        let pattern = RecurrencePattern::monthly_nth(index, weekday)?;
        self.with_shape(PatternShape::MonthlyNth(pattern))
    }

    /// Stop after the local calendar day of `end`.
    pub fn with_ends_at(mut self, end: DateTime<Utc>) -> Result<Self> {
        if matches!(self.bounds, BoundsPolicy::EndsAfter(_)) {
            tracing::warn!("rejected EndsAt: EndsAfter already configured");
            return Err(RecurrenceError::ConflictingBoundsConfiguration);
        }
        self.bounds = BoundsPolicy::EndsAt(end);
        Ok(self)
    }

    /// Stop after `count` occurrences. Not available when repeating on more
    /// than one weekday.
    pub fn with_ends_after(mut self, count: u32) -> Result<Self> {
        let bounds = BoundsPolicy::ends_after(count)?;
        if matches!(self.bounds, BoundsPolicy::EndsAt(_)) {
            tracing::warn!("rejected EndsAfter: EndsAt already configured");
            return Err(RecurrenceError::ConflictingBoundsConfiguration);
        }
        if self.pattern.as_ref().is_some_and(PatternShape::fans_out) {
            tracing::warn!("rejected EndsAfter on a multi-weekday rule");
            return Err(RecurrenceError::UnsupportedBoundsForPattern);
        }
        self.bounds = bounds;
        Ok(self)
    }

    /// Start at `start_at` instead of the host's base date.
    pub fn with_start_at(mut self, start_at: DateTime<Utc>) -> Self {
        self.start_at = Some(start_at);
        self
    }

    fn with_shape(mut self, shape: PatternShape) -> Result<Self> {
        if let Some(existing) = &self.pattern {
            if mem::discriminant(existing) != mem::discriminant(&shape) {
                tracing::warn!(
                    existing = existing.name(),
                    requested = shape.name(),
                    "rejected conflicting pattern configuration"
                );
                return Err(RecurrenceError::ConflictingPatternConfiguration);
            }
        }
        if shape.fans_out() && matches!(self.bounds, BoundsPolicy::EndsAfter(_)) {
            tracing::warn!("rejected multi-weekday pattern: EndsAfter already configured");
            return Err(RecurrenceError::UnsupportedBoundsForPattern);
        }
        self.pattern = Some(shape);
        Ok(self)
    }

    /// Finalize the configuration into rules.
    ///
    /// A weekday configuration yields one rule per weekday, Sunday first; all
    /// other shapes yield exactly one rule. `build` does not consume the
    /// builder and returns equal rules every time it is called.
    ///
    /// # Errors
    /// - `MissingPattern` if no pattern was configured.
    /// - `InvalidParameter` if `tz_offset_seconds` is outside ±86399.
    /// - `UnsupportedBoundsForPattern` for `EndsAfter` with several weekdays.
    pub fn build(
        &self,
        host_base_date: DateTime<Utc>,
        tz_offset_seconds: i32,
    ) -> Result<Vec<Rule>> {
        validate_tz_offset(tz_offset_seconds)?;
        let shape = self.pattern.as_ref().ok_or(RecurrenceError::MissingPattern)?;
        if shape.fans_out() && matches!(self.bounds, BoundsPolicy::EndsAfter(_)) {
            return Err(RecurrenceError::UnsupportedBoundsForPattern);
        }
        let start_at = self.start_at.unwrap_or(host_base_date);

        let patterns = match shape {
            PatternShape::Simple(pattern) | PatternShape::MonthlyNth(pattern) => vec![*pattern],
            PatternShape::Weekdays(days) if days.is_empty() => {
                let weekday = to_calendar_day(start_at, tz_offset_seconds).weekday();
                vec![RecurrencePattern::weekly(weekday)]
            }
            PatternShape::Weekdays(days) => days
                .iter()
                .map(|day| RecurrencePattern::weekly(*day))
                .collect(),
        };

        let rules = patterns
            .into_iter()
            .map(|pattern| Rule::new(start_at, tz_offset_seconds, pattern, self.bounds))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            shape = shape.name(),
            bounds = %self.bounds.kind(),
            rules = rules.len(),
            %start_at,
            tz_offset_seconds,
            "built recurrence rules"
        );
        Ok(rules)
    }

    /// [`build`](Self::build) using the host's base date.
    pub fn build_for<H>(&self, host: &H, tz_offset_seconds: i32) -> Result<Vec<Rule>>
    where
        H: Repeatable + ?Sized,
    {
        self.build(host.repetition_base_date(), tz_offset_seconds)
    }
}
