//! Error types for recurrence-engine operations.
//!
//! Every variant is a configuration or decoding failure. Evaluating an
//! already-built [`Rule`](crate::Rule) never produces an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecurrenceError {
    /// `EndsAfter` was requested for a rule that fans out into several weekdays.
    #[error("EndsAfter is not available for a rule repeating on more than one weekday")]
    UnsupportedBoundsForPattern,

    /// A second, different pattern shape was configured on the same builder.
    #[error("A different recurrence pattern is already configured")]
    ConflictingPatternConfiguration,

    /// Both an end date and an occurrence count were configured.
    #[error("EndsAt and EndsAfter cannot both be configured")]
    ConflictingBoundsConfiguration,

    /// `build` was called before any pattern was configured.
    #[error("No recurrence pattern configured")]
    MissingPattern,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    /// Rule records or configuration could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The rendered RFC 5545 text was rejected by the `rrule` parser.
    #[error("RFC 5545 error: {0}")]
    Rfc5545(String),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
