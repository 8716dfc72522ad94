//! Per-habit statistics and the overall summary across habits.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::completion_rate::completion_rate;
use crate::habit::Habit;
use crate::period::{period_of, Cadence};
use crate::streak::{compute_streak_with_policy, StreakPolicy};

/// Statistics for a single habit as of a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStats {
    pub habit_id: String,
    pub name: String,
    pub cadence: Cadence,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Percentage of periods completed since creation (0-100)
    pub completion_rate: u8,
    /// Whether the habit already has a completion in the current period
    pub completed_this_period: bool,
    /// Raw number of completion records, duplicates included
    pub total_completions: u32,
}

/// Summary across all habits of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_habits: u32,
    /// Habits with a non-zero current streak
    pub active_habits: u32,
    pub total_current_streak: u32,
    pub best_streak: u32,
    pub total_completions: u32,
    /// Rounded mean of the per-habit completion rates
    pub overall_completion_rate: u8,
}

/// Analyzer for habit progress.
#[derive(Debug, Clone, Default)]
pub struct HabitAnalyzer {
    /// Liveness rule for the current streak
    pub policy: StreakPolicy,
}

impl HabitAnalyzer {
    /// Create an analyzer with the default streak policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: StreakPolicy) -> Self {
        Self { policy }
    }

    /// Compute stats for `habit` as of `now`.
    ///
    /// Stored UTC timestamps are moved into `now`'s time zone first, so the
    /// zone of `now` decides where day and week boundaries fall.
    pub fn analyze<Tz: TimeZone>(
        &self,
        habit: &Habit,
        completions: &[DateTime<Utc>],
        now: &DateTime<Tz>,
    ) -> HabitStats {
        let tz = now.timezone();
        let local: Vec<DateTime<Tz>> = completions.iter().map(|c| c.with_timezone(&tz)).collect();
        let created_at = habit.created_at.with_timezone(&tz);

        let streak = compute_streak_with_policy(&local, habit.cadence, now, self.policy);
        let rate = completion_rate(&local, &created_at, habit.cadence, now);
        let current = period_of(now, habit.cadence);

        HabitStats {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            cadence: habit.cadence,
            current_streak: streak.current_streak,
            longest_streak: streak.longest_streak,
            completion_rate: rate,
            completed_this_period: local.iter().any(|c| current.contains(c)),
            total_completions: u32::try_from(completions.len()).unwrap_or(u32::MAX),
        }
    }

    /// Fold per-habit stats into a single summary.
    pub fn summarize(&self, habits: &[HabitStats]) -> OverallStats {
        let mut overall = OverallStats::default();
        let mut rate_sum = 0u32;

        for stats in habits {
            overall.total_habits += 1;
            if stats.current_streak > 0 {
                overall.active_habits += 1;
            }
            overall.total_current_streak += stats.current_streak;
            overall.best_streak = overall.best_streak.max(stats.longest_streak);
            overall.total_completions += stats.total_completions;
            rate_sum += u32::from(stats.completion_rate);
        }

        if overall.total_habits > 0 {
            let n = overall.total_habits;
            overall.overall_completion_rate = ((2 * rate_sum + n) / (2 * n)).min(100) as u8;
        }
        overall
    }
}
