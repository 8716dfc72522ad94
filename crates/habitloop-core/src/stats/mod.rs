//! Statistics built on top of the streak and completion-rate engine.
//!
//! - [`HabitAnalyzer`] turns one habit's completions into [`HabitStats`] and
//!   folds many of those into an [`OverallStats`] summary.
//! - [`leaderboard`] ranks participants by their total current streak.

mod habit_stats;
mod leaderboard;

pub use habit_stats::{HabitAnalyzer, HabitStats, OverallStats};
pub use leaderboard::{leaderboard, LeaderboardEntry, Participant};
