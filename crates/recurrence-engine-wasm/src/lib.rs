//! WASM bindings for recurrence-engine.
//!
//! Exposes rule building, occurrence queries and RRULE export to JavaScript
//! via `wasm-bindgen`. Rules cross the boundary as JSON rule records (the
//! output of `buildRules`), datetimes as ISO 8601 strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p recurrence-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/recurrence-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/recurrence_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use recurrence_engine::calendar_day::{parse_instant, tz_offset_at};
use recurrence_engine::ruleset::occurs_between_any;
use recurrence_engine::{
    enumerate_all, next_occurrence_in, occurs_on_any, rules_from_json, rules_to_json,
    to_rrule_text, RecurrenceError, Rule, RuleConfig,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(e: RecurrenceError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    parse_instant(s).map_err(js_err)
}

fn parse_rules(json: &str) -> Result<Vec<Rule>, JsValue> {
    rules_from_json(json).map_err(|e| JsValue::from_str(&format!("Invalid rules JSON: {}", e)))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Build rules from a JSON rule configuration.
///
/// # Arguments
/// - `config` -- e.g. `{"weekdays": [1, 3], "endsAt": "2023-06-30T00:00:00Z"}`
/// - `host_base_date` -- first day the rule may occur, unless `config.startAt` is set
/// - `tz_offset_seconds` -- the author's fixed UTC offset
///
/// Returns a JSON array of rule records, one per fanned-out weekday.
#[wasm_bindgen(js_name = "buildRules")]
pub fn build_rules(
    config: &str,
    host_base_date: &str,
    tz_offset_seconds: i32,
) -> Result<String, JsValue> {
    let config = RuleConfig::from_json(config).map_err(js_err)?;
    let base = parse_datetime(host_base_date)?;
    let rules = config
        .to_builder()
        .and_then(|builder| builder.build(base, tz_offset_seconds))
        .map_err(js_err)?;
    rules_to_json(&rules).map_err(js_err)
}

/// The fixed UTC offset (seconds) an IANA timezone has at `instant`.
#[wasm_bindgen(js_name = "timezoneOffset")]
pub fn timezone_offset(timezone: &str, instant: &str) -> Result<i32, JsValue> {
    tz_offset_at(timezone, parse_datetime(instant)?).map_err(js_err)
}

/// Whether any of the rules occurs on the local day containing `instant`.
#[wasm_bindgen(js_name = "occursOn")]
pub fn occurs_on(rules: &str, instant: &str) -> Result<bool, JsValue> {
    Ok(occurs_on_any(&parse_rules(rules)?, parse_datetime(instant)?))
}

/// Whether any of the rules occurs on a local day in `[from, to]`.
#[wasm_bindgen(js_name = "occursBetween")]
pub fn occurs_between(rules: &str, from: &str, to: &str) -> Result<bool, JsValue> {
    Ok(occurs_between_any(
        &parse_rules(rules)?,
        parse_datetime(from)?,
        parse_datetime(to)?,
    ))
}

/// The earliest occurrence strictly after the local day of `after`, as
/// RFC 3339, or `undefined` when every rule is exhausted.
#[wasm_bindgen(js_name = "nextOccurrence")]
pub fn next_occurrence(rules: &str, after: &str) -> Result<Option<String>, JsValue> {
    let next = next_occurrence_in(&parse_rules(rules)?, parse_datetime(after)?);
    Ok(next.map(|instant| instant.to_rfc3339()))
}

/// Up to `limit` occurrences across all rules, ascending, as a JSON array of
/// RFC 3339 strings.
#[wasm_bindgen]
pub fn enumerate(rules: &str, limit: u32) -> Result<String, JsValue> {
    let rules = parse_rules(rules)?;
    let occurrences: Vec<String> = enumerate_all(&rules)
        .take(limit as usize)
        .map(|instant| instant.to_rfc3339())
        .collect();
    to_json(&occurrences)
}

/// Render each rule as an RFC 5545 `DTSTART`/`RRULE` block.
///
/// Returns a JSON array of strings, one per rule.
#[wasm_bindgen(js_name = "toRRule")]
pub fn to_rrule(rules: &str) -> Result<String, JsValue> {
    let blocks = parse_rules(rules)?
        .iter()
        .map(to_rrule_text)
        .collect::<Result<Vec<_>, _>>()
        .map_err(js_err)?;
    to_json(&blocks)
}
