//! Tests for RuleBuilder: shape and bounds validation, weekday fan-out, and
//! host base dates.

use chrono::{DateTime, TimeZone, Utc, Weekday};
use recurrence_engine::{
    enumerate_all, matching_rules, next_occurrence_in, BoundsPolicy, RecurrenceError,
    RecurrencePattern, Repeatable, RuleBuilder, RuleConfig,
};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// A host whose recurrences start from a fixed creation date.
struct Task {
    created_at: DateTime<Utc>,
}

impl Repeatable for Task {
    fn repetition_base_date(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn ends_after_on_multi_weekday_rule_is_rejected() {
    let err = RuleBuilder::new()
        .with_weekdays([Weekday::Mon, Weekday::Wed])
        .and_then(|b| b.with_ends_after(3))
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::UnsupportedBoundsForPattern));
}

#[test]
fn multi_weekday_after_ends_after_is_rejected() {
    let err = RuleBuilder::new()
        .with_ends_after(3)
        .and_then(|b| b.with_weekdays([Weekday::Mon, Weekday::Wed]))
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::UnsupportedBoundsForPattern));
}

#[test]
fn second_pattern_shape_is_rejected() {
    let err = RuleBuilder::new()
        .with_simple_interval(2)
        .and_then(|b| b.with_weekdays([Weekday::Mon]))
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::ConflictingPatternConfiguration));

    let err = RuleBuilder::new()
        .with_monthly_nth(1, Weekday::Mon)
        .and_then(|b| b.daily())
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::ConflictingPatternConfiguration));
}

#[test]
fn both_bound_kinds_are_rejected() {
    let err = RuleBuilder::new()
        .with_ends_at(at(2023, 5, 1))
        .and_then(|b| b.with_ends_after(2))
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::ConflictingBoundsConfiguration));

    let err = RuleBuilder::new()
        .with_ends_after(2)
        .and_then(|b| b.with_ends_at(at(2023, 5, 1)))
        .unwrap_err();
    assert!(matches!(err, RecurrenceError::ConflictingBoundsConfiguration));
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(matches!(
        RuleBuilder::new().with_simple_interval(0),
        Err(RecurrenceError::InvalidParameter(_))
    ));
    assert!(matches!(
        RuleBuilder::new().with_monthly_nth(0, Weekday::Fri),
        Err(RecurrenceError::InvalidParameter(_))
    ));
    assert!(matches!(
        RuleBuilder::new().with_monthly_nth(6, Weekday::Fri),
        Err(RecurrenceError::InvalidParameter(_))
    ));
    assert!(matches!(
        RuleBuilder::new().with_ends_after(0),
        Err(RecurrenceError::InvalidParameter(_))
    ));
    assert!(matches!(
        RuleBuilder::new().daily().unwrap().build(at(2023, 4, 15), 90_000),
        Err(RecurrenceError::InvalidParameter(_))
    ));
}

#[test]
fn build_without_pattern_fails() {
    assert!(matches!(
        RuleBuilder::new().build(at(2023, 4, 15), 0),
        Err(RecurrenceError::MissingPattern)
    ));
}

#[test]
fn repeating_the_same_configurator_replaces_parameters() {
    let rules = RuleBuilder::new()
        .with_simple_interval(2)
        .and_then(|b| b.with_simple_interval(7))
        .and_then(|b| b.build(at(2023, 4, 15), 0))
        .unwrap();
    assert_eq!(rules[0].pattern(), &RecurrencePattern::simple(7).unwrap());
}

// ---------------------------------------------------------------------------
// Weekday fan-out
// ---------------------------------------------------------------------------

#[test]
fn weekdays_fan_out_in_sunday_first_order() {
    let rules = RuleBuilder::new()
        .with_weekdays([Weekday::Fri, Weekday::Mon, Weekday::Sun, Weekday::Mon])
        .and_then(|b| b.build(at(2023, 4, 17), 0))
        .unwrap();

    let weekdays: Vec<_> = rules.iter().map(|r| *r.pattern()).collect();
    assert_eq!(
        weekdays,
        vec![
            RecurrencePattern::weekly(Weekday::Sun),
            RecurrencePattern::weekly(Weekday::Mon),
            RecurrencePattern::weekly(Weekday::Fri),
        ]
    );
    for rule in &rules {
        assert_eq!(rule.start_at(), at(2023, 4, 17));
        assert_eq!(rule.bounds(), &BoundsPolicy::Unbounded);
    }
}

#[test]
fn empty_weekdays_fall_back_to_start_weekday() {
    // 22:00 UTC on Saturday 2023-04-15 is Sunday in UTC+4.
    let base = Utc.with_ymd_and_hms(2023, 4, 15, 22, 0, 0).unwrap();
    let builder = RuleBuilder::new().with_weekdays(Vec::<Weekday>::new()).unwrap();

    let utc = builder.build(base, 0).unwrap();
    assert_eq!(utc.len(), 1);
    assert_eq!(utc[0].pattern(), &RecurrencePattern::weekly(Weekday::Sat));

    let dubai = builder.build(base, 4 * 3600).unwrap();
    assert_eq!(dubai[0].pattern(), &RecurrencePattern::weekly(Weekday::Sun));
}

#[test]
fn single_or_empty_weekday_allows_ends_after() {
    assert!(RuleBuilder::new()
        .with_weekdays([Weekday::Mon, Weekday::Mon])
        .and_then(|b| b.with_ends_after(3))
        .is_ok());
    assert!(RuleBuilder::new()
        .with_ends_after(3)
        .and_then(|b| b.with_weekdays(Vec::<Weekday>::new()))
        .is_ok());
}

#[test]
fn fanned_out_rules_share_bounds() {
    let rules = RuleBuilder::new()
        .with_weekdays([Weekday::Mon, Weekday::Wed])
        .and_then(|b| b.with_ends_at(at(2023, 4, 30)))
        .and_then(|b| b.build(at(2023, 4, 17), 0))
        .unwrap();
    let all: Vec<_> = enumerate_all(&rules).collect();
    assert_eq!(
        all,
        vec![
            at(2023, 4, 17),
            at(2023, 4, 19),
            at(2023, 4, 24),
            at(2023, 4, 26),
        ]
    );
}

#[test]
fn union_queries_over_fanned_out_rules() {
    let rules = RuleBuilder::new()
        .with_weekdays([Weekday::Mon, Weekday::Wed])
        .and_then(|b| b.build(at(2023, 4, 17), 0))
        .unwrap();

    let on_wednesday = matching_rules(&rules, at(2023, 4, 19));
    assert_eq!(on_wednesday.len(), 1);
    assert_eq!(on_wednesday[0].pattern(), &RecurrencePattern::weekly(Weekday::Wed));
    assert!(matching_rules(&rules, at(2023, 4, 18)).is_empty());

    assert_eq!(next_occurrence_in(&rules, at(2023, 4, 19)), Some(at(2023, 4, 24)));
}

#[test]
fn merged_enumeration_deduplicates_shared_instants() {
    let start = at(2023, 4, 17);
    let mut rules = RuleBuilder::new()
        .daily()
        .and_then(|b| b.build(start, 0))
        .unwrap();
    rules.extend(
        RuleBuilder::new()
            .with_weekdays([Weekday::Mon])
            .and_then(|b| b.build(start, 0))
            .unwrap(),
    );

    let merged: Vec<_> = enumerate_all(&rules).take(8).collect();
    let daily: Vec<_> = (0..8).map(|d| at(2023, 4, 17 + d)).collect();
    assert_eq!(merged, daily);
}

// ---------------------------------------------------------------------------
// Build semantics
// ---------------------------------------------------------------------------

#[test]
fn build_is_idempotent() {
    let builder = RuleBuilder::new()
        .with_weekdays([Weekday::Tue, Weekday::Thu])
        .and_then(|b| b.with_ends_at(at(2023, 12, 31)))
        .unwrap();
    let first = builder.build(at(2023, 4, 15), 3600).unwrap();
    let second = builder.build(at(2023, 4, 15), 3600).unwrap();
    assert_eq!(first, second);
}

#[test]
fn host_base_date_is_the_default_start() {
    let task = Task {
        created_at: at(2023, 4, 15),
    };
    let builder = RuleBuilder::new().with_simple_interval(5).unwrap();

    let rules = builder.build_for(&task, 0).unwrap();
    assert_eq!(rules[0].start_at(), at(2023, 4, 15));

    let overridden = builder.with_start_at(at(2023, 6, 1)).build_for(&task, 0).unwrap();
    assert_eq!(overridden[0].start_at(), at(2023, 6, 1));
}

// ---------------------------------------------------------------------------
// RuleConfig
// ---------------------------------------------------------------------------

#[test]
fn config_replays_onto_builder() {
    let config = RuleConfig::from_json(
        r#"{"monthlyNth":{"index":2,"weekday":5},"endsAfter":3}"#,
    )
    .unwrap();
    let rules = config.to_builder().unwrap().build(at(2023, 4, 20), 0).unwrap();
    assert_eq!(
        rules[0].pattern(),
        &RecurrencePattern::monthly_nth(2, Weekday::Fri).unwrap()
    );
    assert_eq!(rules[0].bounds(), &BoundsPolicy::ends_after(3).unwrap());
}

#[test]
fn config_hits_builder_validation() {
    let config = RuleConfig::from_json(r#"{"weekdays":[1,3],"endsAfter":3}"#).unwrap();
    assert!(matches!(
        config.to_builder(),
        Err(RecurrenceError::UnsupportedBoundsForPattern)
    ));

    let config = RuleConfig::from_json(r#"{"everyDays":2,"weekdays":[1]}"#).unwrap();
    assert!(matches!(
        config.to_builder(),
        Err(RecurrenceError::ConflictingPatternConfiguration)
    ));

    let config = RuleConfig::from_json(r#"{"weekdays":[9]}"#).unwrap();
    assert!(matches!(
        config.to_builder(),
        Err(RecurrenceError::InvalidParameter(_))
    ));
}

#[test]
fn config_rejects_unknown_fields() {
    assert!(matches!(
        RuleConfig::from_json(r#"{"everyMonth":1}"#),
        Err(RecurrenceError::Json(_))
    ));
}
