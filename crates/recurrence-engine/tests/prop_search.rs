//! Property-based tests for occurrence search using proptest.
//!
//! These verify invariants that hold for *any* rule, not just the scenarios in
//! `search_tests.rs`.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use proptest::prelude::*;
use recurrence_engine::{
    enumerate, next_occurrence, occurs_between, occurs_on, to_calendar_day, weekday_from_index,
    BoundsPolicy, RecurrencePattern, Rule,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_pattern() -> impl Strategy<Value = RecurrencePattern> {
    prop_oneof![
        (1u32..=30).prop_map(|n| RecurrencePattern::simple(n).unwrap()),
        (0u8..7).prop_map(|w| RecurrencePattern::weekly(weekday_from_index(w).unwrap())),
        (1u8..=5, 0u8..7).prop_map(|(k, w)| {
            RecurrencePattern::monthly_nth(k, weekday_from_index(w).unwrap()).unwrap()
        }),
    ]
}

/// A start between 2020 and 2026 at a whole hour.
fn arb_start() -> impl Strategy<Value = DateTime<Utc>> {
    (2020i32..=2026, 1u32..=12, 1u32..=28, 0u32..=23)
        .prop_map(|(y, m, d, h)| Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
}

/// Whole-hour offsets from UTC-12 to UTC+14.
fn arb_offset() -> impl Strategy<Value = i32> {
    (-12i32..=14).prop_map(|h| h * 3600)
}

/// A rule whose occurrence sequence is finite.
fn arb_bounded_rule() -> impl Strategy<Value = Rule> {
    (
        arb_pattern(),
        arb_start(),
        arb_offset(),
        prop_oneof![
            (1u32..=12).prop_map(|c| (Some(c), 0i64)),
            (0i64..=400).prop_map(|days| (None, days)),
        ],
    )
        .prop_map(|(pattern, start, offset, (count, days))| {
            let bounds = match count {
                Some(c) => BoundsPolicy::ends_after(c).unwrap(),
                None => BoundsPolicy::EndsAt(start + Duration::days(days)),
            };
            Rule::new(start, offset, pattern, bounds).unwrap()
        })
}

fn arb_unbounded_rule() -> impl Strategy<Value = Rule> {
    (arb_pattern(), arb_start(), arb_offset()).prop_map(|(pattern, start, offset)| {
        Rule::new(start, offset, pattern, BoundsPolicy::Unbounded).unwrap()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: enumeration is restartable
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn enumeration_is_restartable(rule in arb_bounded_rule()) {
        let first: Vec<_> = enumerate(&rule).collect();
        let second: Vec<_> = enumerate(&rule).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn unbounded_enumeration_is_restartable(rule in arb_unbounded_rule()) {
        let first: Vec<_> = enumerate(&rule).take(30).collect();
        let second: Vec<_> = enumerate(&rule).take(30).collect();
        prop_assert_eq!(first.len(), 30);
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Property 2: every enumerated instant occurs, in strictly ascending order,
// and next_occurrence steps through the same sequence
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn enumeration_agrees_with_occurs_on_and_next(rule in arb_bounded_rule()) {
        let occurrences: Vec<_> = enumerate(&rule).collect();

        for instant in &occurrences {
            prop_assert!(occurs_on(&rule, *instant), "{} does not occur", instant);
        }
        for pair in occurrences.windows(2) {
            prop_assert!(pair[0] < pair[1]);
            prop_assert_eq!(next_occurrence(&rule, pair[0]), Some(pair[1]));
        }
        if let Some(last) = occurrences.last() {
            prop_assert_eq!(next_occurrence(&rule, *last), None);
        }
        if let BoundsPolicy::EndsAfter(count) = rule.bounds() {
            prop_assert!(occurrences.len() <= count.get() as usize);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: occurs_between agrees with brute-force enumeration
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn occurs_between_matches_brute_force(
        rule in arb_bounded_rule(),
        from_offset in -60i64..=500,
        len in 0i64..=60,
    ) {
        let from = rule.start_at() + Duration::days(from_offset);
        let to = from + Duration::days(len);
        let from_day = to_calendar_day(from, rule.tz_offset_seconds());
        let to_day = to_calendar_day(to, rule.tz_offset_seconds());

        let expected = enumerate(&rule).any(|o| {
            let day = to_calendar_day(o, rule.tz_offset_seconds());
            day >= from_day && day <= to_day
        });
        prop_assert_eq!(occurs_between(&rule, from, to), expected);
    }
}

// ---------------------------------------------------------------------------
// Property 4: monthly occurrences are exactly the k-th weekday of their month
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn monthly_occurrences_have_requested_index(
        k in 1u8..=5,
        w in 0u8..7,
        start in arb_start(),
        offset in arb_offset(),
    ) {
        let weekday = weekday_from_index(w).unwrap();
        let pattern = RecurrencePattern::monthly_nth(k, weekday).unwrap();
        let rule = Rule::new(start, offset, pattern, BoundsPolicy::Unbounded).unwrap();

        let mut previous_month = None;
        for instant in enumerate(&rule).take(24) {
            let date = to_calendar_day(instant, offset).date();
            prop_assert_eq!(date.weekday(), weekday);
            prop_assert_eq!((date.day() - 1) / 7 + 1, u32::from(k));
            let month = (date.year(), date.month());
            prop_assert_ne!(Some(month), previous_month, "two occurrences in one month");
            previous_month = Some(month);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: occurs_on depends only on the local calendar day
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn occurs_on_is_timezone_invariant_within_a_local_day(
        rule in arb_unbounded_rule(),
        day_offset in -10i64..=400,
        a in 0i64..86_400,
        b in 0i64..86_400,
    ) {
        let local_day = rule.start_day().0 + day_offset;
        let midnight = local_day * 86_400 - i64::from(rule.tz_offset_seconds());
        let first = Utc.timestamp_opt(midnight + a, 0).unwrap();
        let second = Utc.timestamp_opt(midnight + b, 0).unwrap();
        prop_assert_eq!(occurs_on(&rule, first), occurs_on(&rule, second));
    }
}

// ---------------------------------------------------------------------------
// Property 6: simple interval arithmetic
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn simple_rule_first_steps(n in 1u32..=30, start in arb_start(), offset in arb_offset()) {
        let pattern = RecurrencePattern::simple(n).unwrap();
        let rule = Rule::new(start, offset, pattern, BoundsPolicy::Unbounded).unwrap();

        prop_assert!(occurs_on(&rule, start));
        if n > 1 {
            prop_assert!(!occurs_on(&rule, start + Duration::days(1)));
        }
        prop_assert_eq!(
            next_occurrence(&rule, start),
            Some(start + Duration::days(i64::from(n)))
        );
    }
}
