//! # recurrence-engine
//!
//! Calendar-day recurrence rules: "every N days", "every week on {weekdays}"
//! and "the Kth weekday of every month", each with an optional end date or
//! occurrence count.
//!
//! Queries are answered on the rule author's *local* calendar day (a fixed
//! UTC offset carried by the rule), never the raw UTC date of an instant.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use recurrence_engine::{enumerate, next_occurrence, RuleBuilder};
//!
//! let start = Utc.with_ymd_and_hms(2023, 4, 15, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2023, 4, 30, 0, 0, 0).unwrap();
//! let rules = RuleBuilder::new()
//!     .with_simple_interval(5)
//!     .and_then(|b| b.with_ends_at(end))
//!     .and_then(|b| b.build(start, 0))
//!     .unwrap();
//!
//! assert_eq!(enumerate(&rules[0]).count(), 4);
//! assert_eq!(next_occurrence(&rules[0], end), None);
//! ```
//!
//! ## Modules
//!
//! - [`calendar_day`] -- instant + offset → local day; weekday encoding
//! - [`pattern`] -- `RecurrencePattern` and day-membership matching
//! - [`bounds`] -- `BoundsPolicy` (unbounded / ends at / ends after)
//! - [`rule`] -- the immutable `Rule` value
//! - [`search`] -- `occurs_on`, `occurs_between`, `next_occurrence`, `enumerate`
//! - [`ruleset`] -- union queries over a host's fanned-out rules
//! - [`builder`] -- `RuleBuilder` and the `Repeatable` host capability
//! - [`config`] -- `RuleConfig`, the JSON form of a builder session
//! - [`record`] -- `RuleRecord`, the rule-store tuple
//! - [`rfc5545`] -- RRULE rendering and `rrule`-crate expansion
//! - [`error`] -- Error types

pub mod bounds;
pub mod builder;
pub mod calendar_day;
pub mod config;
pub mod error;
pub mod pattern;
pub mod record;
pub mod rfc5545;
pub mod rule;
pub mod ruleset;
pub mod search;

pub use bounds::{BoundsKind, BoundsPolicy};
pub use builder::{Repeatable, RuleBuilder};
pub use calendar_day::{to_calendar_day, weekday_from_index, weekday_index, CalendarDay};
pub use config::RuleConfig;
pub use error::RecurrenceError;
pub use pattern::{PatternKind, RecurrencePattern, WeekOfMonth};
pub use record::{rules_from_json, rules_to_json, RuleRecord};
pub use rfc5545::{expand_with_rrule, to_rrule_text};
pub use rule::Rule;
pub use ruleset::{enumerate_all, matching_rules, next_occurrence_in, occurs_on_any};
pub use search::{
    enumerate, is_active_on, last_occurrence, next_occurrence, occurrences_between, occurs_between,
    occurs_on, Occurrences,
};
