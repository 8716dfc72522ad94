//! Ranking of participants by their combined current streak.

use serde::{Deserialize, Serialize};

use super::habit_stats::HabitStats;

/// One participant's habits, already analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub username: String,
    pub habits: Vec<HabitStats>,
}

/// A ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: u32,
    pub user_id: String,
    pub username: String,
    pub total_current_streak: u32,
    pub best_streak: u32,
    pub habit_count: u32,
    pub total_completions: u32,
}

/// Rank participants by total current streak, highest first.
///
/// Ties keep their input order.
pub fn leaderboard<I>(participants: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = Participant>,
{
    let mut entries: Vec<LeaderboardEntry> = participants
        .into_iter()
        .map(|p| LeaderboardEntry {
            rank: 0,
            total_current_streak: p.habits.iter().map(|h| h.current_streak).sum(),
            best_streak: p.habits.iter().map(|h| h.longest_streak).max().unwrap_or(0),
            habit_count: u32::try_from(p.habits.len()).unwrap_or(u32::MAX),
            total_completions: p.habits.iter().map(|h| h.total_completions).sum(),
            user_id: p.user_id,
            username: p.username,
        })
        .collect();

    entries.sort_by(|a, b| b.total_current_streak.cmp(&a.total_current_streak));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = u32::try_from(i).map_or(u32::MAX, |i| i.saturating_add(1));
    }
    entries
}
