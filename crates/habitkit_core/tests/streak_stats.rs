use chrono::{Duration, NaiveDate};
use habitkit_core::dates::{format_date, parse_date};
use habitkit_core::{best_streak, current_streak};
use std::collections::BTreeSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn streak_is_zero_whenever_latest_completion_is_older_than_yesterday() {
    let today = date(2024, 7, 20);

    for days_back in 2..30 {
        let latest = today - Duration::days(days_back);
        let completions: BTreeSet<NaiveDate> =
            (0..5).map(|offset| latest - Duration::days(offset)).collect();
        assert_eq!(
            current_streak(&completions, today),
            0,
            "latest {days_back} days back must break the streak"
        );
    }
}

#[test]
fn grace_period_covers_exactly_today_and_yesterday() {
    let today = date(2024, 7, 20);

    assert_eq!(current_streak(&BTreeSet::from([today]), today), 1);
    assert_eq!(
        current_streak(&BTreeSet::from([today - Duration::days(1)]), today),
        1
    );
    assert_eq!(
        current_streak(&BTreeSet::from([today - Duration::days(2)]), today),
        0
    );
}

#[test]
fn only_the_most_recent_run_counts() {
    let today = date(2024, 7, 20);
    let completions = BTreeSet::from([
        today,
        today - Duration::days(2),
        today - Duration::days(3),
        today - Duration::days(4),
    ]);
    assert_eq!(current_streak(&completions, today), 1);
    assert_eq!(best_streak(&completions), 3);
}

#[test]
fn best_streak_dominates_current_for_random_like_sets() {
    let today = date(2024, 7, 20);

    // A spread of fixed shapes rather than a generator; the property must
    // hold for each.
    let shapes: &[&[i64]] = &[
        &[0],
        &[1],
        &[0, 1, 2],
        &[0, 2, 3, 4],
        &[1, 2, 5, 6, 7, 8],
        &[3, 4, 5],
        &[0, 1, 3, 4, 5, 9, 10, 11, 12],
    ];

    for shape in shapes {
        let completions: BTreeSet<NaiveDate> = shape
            .iter()
            .map(|days_back| today - Duration::days(*days_back))
            .collect();
        let current = current_streak(&completions, today);
        let best = best_streak(&completions);
        assert!(
            best >= current,
            "best {best} < current {current} for shape {shape:?}"
        );
    }
}

#[test]
fn best_streak_matches_fixed_calendar_example() {
    let completions = BTreeSet::from([
        date(2024, 1, 1),
        date(2024, 1, 2),
        date(2024, 1, 3),
        date(2024, 1, 10),
    ]);
    assert_eq!(best_streak(&completions), 3);
}

#[test]
fn streaks_span_month_and_year_boundaries() {
    let today = date(2024, 1, 2);
    let completions = BTreeSet::from([
        date(2023, 12, 30),
        date(2023, 12, 31),
        date(2024, 1, 1),
        date(2024, 1, 2),
    ]);
    assert_eq!(current_streak(&completions, today), 4);
    assert_eq!(best_streak(&completions), 4);
}

#[test]
fn format_then_parse_is_idempotent_across_a_year() {
    let mut day = date(2024, 1, 1);
    for _ in 0..366 {
        let text = format_date(day);
        let reparsed = parse_date(&text).unwrap();
        assert_eq!(reparsed, day);
        assert_eq!(format_date(reparsed), text);
        day = day.succ_opt().unwrap();
    }
}
