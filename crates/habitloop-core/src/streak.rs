//! Streak engine.
//!
//! Streaks are computed in two independent phases:
//! 1. Completions are reduced to the set of distinct period keys they fall
//!    into, newest first. Several completions in one period count once.
//! 2. The sorted keys are split into runs of adjacent periods.
//!
//! The longest streak is the longest run. The current streak is the run that
//! starts at the most recent completed period, provided that period is still
//! close enough to `now` under the active [`StreakPolicy`].

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::period::{period_key, periods_between, Cadence};

/// Current and longest streak of a habit, in periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// How far behind `now` the latest completed period may be while the
/// streak still counts as current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// The current period or the one right before it. An open period that
    /// has not been completed yet does not break the streak.
    #[default]
    OnePeriodGrace,
    /// Only a completion in the current period keeps the streak alive.
    CurrentPeriodOnly,
}

impl StreakPolicy {
    /// Number of whole periods the latest completion may lag behind `now`.
    pub fn allowed_lag(self) -> i64 {
        match self {
            StreakPolicy::OnePeriodGrace => 1,
            StreakPolicy::CurrentPeriodOnly => 0,
        }
    }
}

/// Distinct period keys covered by `completions` on the clock of `tz`, most
/// recent first.
///
/// Each instant is moved into `tz` before bucketing, so the offset an instant
/// happens to carry does not decide its period.
pub fn distinct_period_keys<Tz: TimeZone>(
    completions: &[DateTime<Tz>],
    cadence: Cadence,
    tz: &Tz,
) -> Vec<NaiveDate> {
    let keys: BTreeSet<NaiveDate> = completions
        .iter()
        .map(|c| period_key(&c.with_timezone(tz), cadence))
        .collect();
    keys.into_iter().rev().collect()
}

/// Lengths of the runs of adjacent periods in `keys_desc`.
///
/// `keys_desc` must be distinct and sorted newest first. The first element
/// of the result is the run that starts at the newest key.
pub fn run_lengths(keys_desc: &[NaiveDate], cadence: Cadence) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut iter = keys_desc.iter();
    let Some(mut previous) = iter.next() else {
        return runs;
    };

    let mut run = 1u32;
    for key in iter {
        if periods_between(*previous, *key, cadence) == 1 {
            run += 1;
        } else {
            runs.push(run);
            run = 1;
        }
        previous = key;
    }
    runs.push(run);
    runs
}

/// Compute the current and longest streak with the default policy.
pub fn compute_streak<Tz: TimeZone>(
    completions: &[DateTime<Tz>],
    cadence: Cadence,
    now: &DateTime<Tz>,
) -> StreakResult {
    compute_streak_with_policy(completions, cadence, now, StreakPolicy::default())
}

/// Compute the current and longest streak as of `now`.
///
/// `now`'s time zone is the reference clock for every completion. Completions
/// in periods after `now`'s period are ignored.
pub fn compute_streak_with_policy<Tz: TimeZone>(
    completions: &[DateTime<Tz>],
    cadence: Cadence,
    now: &DateTime<Tz>,
    policy: StreakPolicy,
) -> StreakResult {
    if completions.is_empty() {
        return StreakResult::default();
    }

    let now_key = period_key(now, cadence);
    let mut keys = distinct_period_keys(completions, cadence, &now.timezone());
    let future = keys.iter().take_while(|k| **k > now_key).count();
    if future > 0 {
        tracing::warn!(future, %now_key, "ignoring completions dated after the current period");
        keys.retain(|k| *k <= now_key);
    }

    let runs = run_lengths(&keys, cadence);
    let longest_streak = runs.iter().copied().max().unwrap_or(0);

    let alive = keys
        .first()
        .map(|latest| periods_between(now_key, *latest, cadence) <= policy.allowed_lag())
        .unwrap_or(false);
    let current_streak = if alive { runs[0] } else { 0 };

    tracing::debug!(
        %cadence,
        periods = keys.len(),
        runs = runs.len(),
        current_streak,
        longest_streak,
        "computed streak"
    );

    StreakResult {
        current_streak,
        longest_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn utc_datetime(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
    }

    fn days_before(now: DateTime<Utc>, days: &[i64]) -> Vec<DateTime<Utc>> {
        days.iter().map(|d| now - Duration::days(*d)).collect()
    }

    #[test]
    fn test_empty_completions() {
        let now = utc_datetime(2024, 1, 17, 12, 0);
        let result = compute_streak(&[], Cadence::Daily, &now);
        assert_eq!(result, StreakResult::default());
    }

    #[test]
    fn test_single_completion_now() {
        let now = utc_datetime(2024, 1, 17, 12, 0);
        let result = compute_streak(&[now], Cadence::Daily, &now);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn test_five_consecutive_days_ending_today() {
        let now = utc_datetime(2024, 1, 17, 20, 0);
        let completions = days_before(now, &[0, 1, 2, 3, 4]);
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 5);
        assert_eq!(result.longest_streak, 5);
    }

    #[test]
    fn test_gap_splits_runs() {
        // days 1, 2, then a gap, then 5 and 6 (today)
        let now = utc_datetime(2024, 1, 6, 18, 0);
        let completions = vec![
            utc_datetime(2024, 1, 1, 9, 0),
            utc_datetime(2024, 1, 2, 9, 0),
            utc_datetime(2024, 1, 5, 9, 0),
            utc_datetime(2024, 1, 6, 9, 0),
        ];
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_grace_period_for_yesterday() {
        let now = utc_datetime(2024, 1, 17, 8, 0);
        let completions = days_before(now, &[1, 2, 3]);
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn test_broken_streak_keeps_longest() {
        let now = utc_datetime(2024, 1, 17, 8, 0);
        let completions = days_before(now, &[2, 3, 4, 5]);
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 4);
    }

    #[test]
    fn test_duplicates_within_period_count_once() {
        let now = utc_datetime(2024, 1, 17, 22, 0);
        let completions = vec![
            utc_datetime(2024, 1, 17, 7, 0),
            utc_datetime(2024, 1, 17, 7, 0),
            utc_datetime(2024, 1, 17, 21, 0),
            utc_datetime(2024, 1, 16, 12, 0),
        ];
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_unsorted_input() {
        let now = utc_datetime(2024, 1, 17, 12, 0);
        let completions = days_before(now, &[2, 0, 1, 7, 6]);
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn test_longest_run_in_history() {
        let now = utc_datetime(2024, 1, 30, 12, 0);
        let completions = days_before(now, &[0, 10, 11, 12, 13, 14, 20, 21]);
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 5);
    }

    #[test]
    fn test_weekly_streak() {
        // Wednesday; weeks start 2024-01-15, 01-08, 01-01
        let now = utc_datetime(2024, 1, 17, 12, 0);
        let completions = vec![
            utc_datetime(2024, 1, 15, 9, 0),
            utc_datetime(2024, 1, 14, 23, 0), // Sunday of previous week
            utc_datetime(2024, 1, 9, 9, 0),   // same week as above
            utc_datetime(2024, 1, 3, 9, 0),
        ];
        let result = compute_streak(&completions, Cadence::Weekly, &now);
        assert_eq!(result.current_streak, 3);
        assert_eq!(result.longest_streak, 3);
    }

    #[test]
    fn test_weekly_grace_for_last_week() {
        let now = utc_datetime(2024, 1, 17, 12, 0);
        let completions = vec![utc_datetime(2024, 1, 10, 9, 0), utc_datetime(2024, 1, 2, 9, 0)];
        let result = compute_streak(&completions, Cadence::Weekly, &now);
        assert_eq!(result.current_streak, 2);

        let stale = vec![utc_datetime(2024, 1, 2, 9, 0)];
        let result = compute_streak(&stale, Cadence::Weekly, &now);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn test_current_period_only_policy() {
        let now = utc_datetime(2024, 1, 17, 8, 0);
        let completions = days_before(now, &[1, 2]);
        let result = compute_streak_with_policy(
            &completions,
            Cadence::Daily,
            &now,
            StreakPolicy::CurrentPeriodOnly,
        );
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 2);

        let completions = days_before(now, &[0, 1, 2]);
        let result = compute_streak_with_policy(
            &completions,
            Cadence::Daily,
            &now,
            StreakPolicy::CurrentPeriodOnly,
        );
        assert_eq!(result.current_streak, 3);
    }

    #[test]
    fn test_future_completions_ignored() {
        let now = utc_datetime(2024, 1, 17, 8, 0);
        let mut completions = days_before(now, &[0, 1]);
        completions.push(now + Duration::days(3));
        let result = compute_streak(&completions, Cadence::Daily, &now);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.longest_streak, 2);
    }

    #[test]
    fn test_run_lengths_phase() {
        let keys: Vec<NaiveDate> = [10, 9, 8, 5, 3, 2]
            .iter()
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, *d).unwrap())
            .collect();
        assert_eq!(run_lengths(&keys, Cadence::Daily), vec![3, 1, 2]);
        assert!(run_lengths(&[], Cadence::Daily).is_empty());
    }

    #[test]
    fn test_distinct_period_keys_phase() {
        let completions = vec![
            utc_datetime(2024, 1, 16, 9, 0),
            utc_datetime(2024, 1, 17, 9, 0),
            utc_datetime(2024, 1, 16, 22, 0),
        ];
        let keys = distinct_period_keys(&completions, Cadence::Daily, &Utc);
        assert_eq!(
            keys,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
            ]
        );
        assert_eq!(distinct_period_keys(&completions, Cadence::Weekly, &Utc).len(), 1);
    }

    #[test]
    fn test_completions_bucketed_on_now_clock() {
        // 22:30 UTC on the 16th carries +02:00 (already the 17th there), but
        // on now's UTC clock it belongs to the 16th
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let utc_clock = FixedOffset::east_opt(0).unwrap();
        let late = utc_datetime(2024, 1, 16, 22, 30).with_timezone(&plus_two);
        let now = utc_datetime(2024, 1, 18, 12, 0).with_timezone(&utc_clock);

        let tagged = compute_streak(&[late], Cadence::Daily, &now);
        let reference = compute_streak(&[late.with_timezone(&utc_clock)], Cadence::Daily, &now);
        assert_eq!(tagged, reference);
        assert_eq!(tagged.current_streak, 0);
        assert_eq!(tagged.longest_streak, 1);
    }

    #[test]
    fn test_distinct_keys_ignore_carried_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let instant = utc_datetime(2024, 1, 16, 22, 30);
        let completions = vec![
            instant.with_timezone(&plus_two),
            instant.with_timezone(&minus_five),
        ];
        let utc_clock = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            distinct_period_keys(&completions, Cadence::Daily, &utc_clock),
            vec![NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()]
        );
    }
}
