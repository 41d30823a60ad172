//! # recurrence-engine-python
//!
//! Python bindings for recurrence-engine, built with PyO3.
//!
//! Exposes the following functions to Python as the `recurrence_engine_py`
//! module. Rules cross the boundary as JSON rule-record strings.
//!
//! - `build_rules(config, host_base_date, tz_offset_seconds)` -- config JSON -> rules JSON
//! - `timezone_offset(timezone, instant)` -- IANA zone -> fixed offset seconds
//! - `occurs_on(rules, instant)` / `occurs_between(rules, from, to)` -- bool
//! - `next_occurrence(rules, after)` -- RFC 3339 string or `None`
//! - `enumerate(rules, limit)` -- list of RFC 3339 strings
//! - `to_rrule(rules)` -- list of RRULE blocks

use chrono::{DateTime, Utc};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use recurrence_engine::calendar_day::{parse_instant, tz_offset_at};
use recurrence_engine::ruleset::occurs_between_any;
use recurrence_engine::{
    enumerate_all, next_occurrence_in, occurs_on_any, rules_from_json, rules_to_json,
    to_rrule_text, RecurrenceError, Rule, RuleConfig,
};

fn value_err(e: RecurrenceError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_datetime(s: &str) -> PyResult<DateTime<Utc>> {
    parse_instant(s).map_err(value_err)
}

fn parse_rules(json: &str) -> PyResult<Vec<Rule>> {
    rules_from_json(json).map_err(value_err)
}

/// Build rules from a JSON rule configuration.
///
/// Args:
///     config: JSON such as `{"everyDays": 5, "endsAt": "2023-04-30T00:00:00Z"}`.
///     host_base_date: First day the rule may occur (ISO 8601).
///     tz_offset_seconds: The author's fixed UTC offset.
///
/// Returns:
///     A JSON array of rule records.
///
/// Raises:
///     ValueError: If the configuration is invalid or contradictory.
#[pyfunction]
#[pyo3(signature = (config, host_base_date, tz_offset_seconds=0))]
fn build_rules(config: &str, host_base_date: &str, tz_offset_seconds: i32) -> PyResult<String> {
    let config = RuleConfig::from_json(config).map_err(value_err)?;
    let base = parse_datetime(host_base_date)?;
    let rules = config
        .to_builder()
        .and_then(|builder| builder.build(base, tz_offset_seconds))
        .map_err(value_err)?;
    rules_to_json(&rules).map_err(value_err)
}

/// The fixed UTC offset, in seconds, an IANA timezone has at `instant`.
#[pyfunction]
fn timezone_offset(timezone: &str, instant: &str) -> PyResult<i32> {
    tz_offset_at(timezone, parse_datetime(instant)?).map_err(value_err)
}

/// Whether any rule occurs on the local day containing `instant`.
#[pyfunction]
fn occurs_on(rules: &str, instant: &str) -> PyResult<bool> {
    Ok(occurs_on_any(&parse_rules(rules)?, parse_datetime(instant)?))
}

/// Whether any rule occurs on a local day in `[from_, to]`.
#[pyfunction]
#[pyo3(signature = (rules, from_, to))]
fn occurs_between(rules: &str, from_: &str, to: &str) -> PyResult<bool> {
    Ok(occurs_between_any(
        &parse_rules(rules)?,
        parse_datetime(from_)?,
        parse_datetime(to)?,
    ))
}

/// The earliest occurrence strictly after the local day of `after`.
///
/// Returns:
///     An RFC 3339 string, or None when every rule is exhausted.
#[pyfunction]
fn next_occurrence(rules: &str, after: &str) -> PyResult<Option<String>> {
    let next = next_occurrence_in(&parse_rules(rules)?, parse_datetime(after)?);
    Ok(next.map(|instant| instant.to_rfc3339()))
}

/// Up to `limit` occurrences across all rules, ascending.
#[pyfunction]
#[pyo3(signature = (rules, limit=20))]
fn enumerate(rules: &str, limit: usize) -> PyResult<Vec<String>> {
    let rules = parse_rules(rules)?;
    Ok(enumerate_all(&rules)
        .take(limit)
        .map(|instant| instant.to_rfc3339())
        .collect())
}

/// Render each rule as an RFC 5545 `DTSTART`/`RRULE` block.
#[pyfunction]
fn to_rrule(rules: &str) -> PyResult<Vec<String>> {
    parse_rules(rules)?
        .iter()
        .map(|rule| to_rrule_text(rule).map_err(value_err))
        .collect()
}

/// The `recurrence_engine_py` Python module, implemented in Rust via PyO3.
#[pymodule]
fn recurrence_engine_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_rules, m)?)?;
    m.add_function(wrap_pyfunction!(timezone_offset, m)?)?;
    m.add_function(wrap_pyfunction!(occurs_on, m)?)?;
    m.add_function(wrap_pyfunction!(occurs_between, m)?)?;
    m.add_function(wrap_pyfunction!(next_occurrence, m)?)?;
    m.add_function(wrap_pyfunction!(enumerate, m)?)?;
    m.add_function(wrap_pyfunction!(to_rrule, m)?)?;
    Ok(())
}
