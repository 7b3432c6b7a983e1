//! Streak and completion statistics engine.
//!
//! # Responsibility
//! - Turn an unordered set of completion dates into current streak, best
//!   historical streak and completion rate.
//!
//! # Invariants
//! - Pure functions: no I/O, no clock reads; the reference date is always
//!   passed in by the caller.
//! - A current streak survives until one full day passes with no
//!   completion: the most recent completion may be today or yesterday.
//! - `best_streak >= current_streak` for any completion set and reference
//!   date.

use crate::dates::days_between;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

const MS_PER_DAY: i64 = 86_400_000;

/// Derived statistics for one habit's detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    /// Total number of recorded completions.
    pub total: u32,
    /// Consecutive-day run ending today or yesterday.
    pub current_streak: u32,
    /// Longest consecutive-day run anywhere in history.
    pub best_streak: u32,
    /// Percentage of days completed since creation, 0..=100 (can exceed
    /// 100 only if completions were backfilled before creation day).
    pub completion_rate: u32,
}

/// Counts the consecutive-day run ending at `today` or the day before.
///
/// Returns 0 for an empty set, and 0 once the most recent completion is
/// more than one day in the past (the streak is broken only after an
/// entire day lapses with no completion).
pub fn current_streak(completions: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut descending = completions.iter().rev();
    let latest = match descending.next() {
        Some(date) => *date,
        None => return 0,
    };

    let yesterday = today - Duration::days(1);
    if latest != today && latest != yesterday {
        return 0;
    }

    let mut streak = 1;
    let mut newer = latest;
    for &older in descending {
        if days_between(older, newer) != 1 {
            break;
        }
        streak += 1;
        newer = older;
    }
    streak
}

/// Finds the longest consecutive-day run in the whole completion history.
///
/// A gap of more than one day resets the running count to 1; a gap of 0
/// cannot occur because the set holds each date at most once.
pub fn best_streak(completions: &BTreeSet<NaiveDate>) -> u32 {
    let mut ascending = completions.iter();
    let mut previous = match ascending.next() {
        Some(date) => *date,
        None => return 0,
    };

    let mut best = 1;
    let mut run = 1;
    for &date in ascending {
        if days_between(previous, date) == 1 {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
        previous = date;
    }
    best
}

/// Completion rate as a rounded percentage of days since creation.
///
/// `round(count / max(1, ceil((now - created_at) / 1 day)) * 100)`, and 0
/// when there are no completions. The denominator ignores the repeat
/// schedule: a habit due only on Fridays is measured against every
/// elapsed day.
pub fn completion_rate(
    completion_count: u32,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> u32 {
    if completion_count == 0 {
        return 0;
    }

    let elapsed_ms = now.signed_duration_since(created_at).num_milliseconds();
    let days_since_creation = elapsed_ms.div_euclid(MS_PER_DAY)
        + i64::from(elapsed_ms.rem_euclid(MS_PER_DAY) > 0);
    let denominator = days_since_creation.max(1);

    (f64::from(completion_count) / denominator as f64 * 100.0).round() as u32
}

/// Assembles the full stat block for one habit.
pub fn habit_stats(
    completions: &BTreeSet<NaiveDate>,
    created_at: DateTime<Utc>,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> HabitStats {
    let total = completions.len() as u32;
    HabitStats {
        total,
        current_streak: current_streak(completions, today),
        best_streak: best_streak(completions),
        completion_rate: completion_rate(total, created_at, now),
    }
}

#[cfg(test)]
mod tests {
    use super::{best_streak, completion_rate, current_streak};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn set(dates: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        dates.iter().copied().collect()
    }

    #[test]
    fn empty_set_has_no_streaks() {
        let today = date(2024, 6, 15);
        assert_eq!(current_streak(&BTreeSet::new(), today), 0);
        assert_eq!(best_streak(&BTreeSet::new()), 0);
    }

    #[test]
    fn single_completion_today_counts_one() {
        let today = date(2024, 6, 15);
        assert_eq!(current_streak(&set(&[today]), today), 1);
    }

    #[test]
    fn yesterday_only_keeps_grace_streak() {
        let today = date(2024, 6, 15);
        let yesterday = today - Duration::days(1);
        assert_eq!(current_streak(&set(&[yesterday]), today), 1);
    }

    #[test]
    fn streak_is_zero_once_a_full_day_lapses() {
        let today = date(2024, 6, 15);
        let two_days_ago = today - Duration::days(2);
        let run = set(&[
            two_days_ago,
            two_days_ago - Duration::days(1),
            two_days_ago - Duration::days(2),
        ]);
        assert_eq!(current_streak(&run, today), 0);
    }

    #[test]
    fn consecutive_days_accumulate() {
        let today = date(2024, 6, 15);
        let run = set(&[
            today,
            today - Duration::days(1),
            today - Duration::days(2),
        ]);
        assert_eq!(current_streak(&run, today), 3);
    }

    #[test]
    fn gap_breaks_the_current_run() {
        let today = date(2024, 6, 15);
        let gapped = set(&[today, today - Duration::days(2)]);
        assert_eq!(current_streak(&gapped, today), 1);
    }

    #[test]
    fn best_streak_finds_historical_run() {
        let completions = set(&[
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
            date(2024, 1, 10),
        ]);
        assert_eq!(best_streak(&completions), 3);
    }

    #[test]
    fn best_streak_never_below_current() {
        let today = date(2024, 6, 15);
        let completions = set(&[
            today,
            today - Duration::days(1),
            date(2024, 1, 1),
            date(2024, 1, 2),
            date(2024, 1, 3),
        ]);
        let current = current_streak(&completions, today);
        assert!(best_streak(&completions) >= current);
        assert_eq!(current, 2);
        assert_eq!(best_streak(&completions), 3);
    }

    #[test]
    fn completion_rate_is_zero_without_completions() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();
        assert_eq!(completion_rate(0, created, now), 0);
    }

    #[test]
    fn completion_rate_rounds_against_elapsed_days() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        // 9.5 elapsed days ceil to 10; 3/10 -> 30%.
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(completion_rate(3, created, now), 30);
        // 1/3 -> 33.33 rounds to 33.
        let now = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();
        assert_eq!(completion_rate(1, created, now), 33);
    }

    #[test]
    fn completion_rate_clamps_denominator_on_creation_day() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let now = created;
        assert_eq!(completion_rate(1, created, now), 100);
    }
}
