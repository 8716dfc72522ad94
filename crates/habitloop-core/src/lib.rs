//! # habitloop Core Library
//!
//! This library provides the core logic for the habitloop habit tracker.
//! The CLI binary is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Period Calculator**: maps an instant to the day or Monday-based week
//!   containing it
//! - **Streak Engine**: current and longest run of consecutive completed periods
//! - **Completion Rate**: share of periods since creation with a completion
//! - **Stats**: per-habit and per-user summaries, leaderboard ranking
//! - **Storage**: SQLite habit store and TOML configuration
//!
//! The engine functions are pure: the current instant is always an argument
//! and its time zone is the reference clock.
//!
//! ## Key Components
//!
//! - [`compute_streak`]: current and longest streak
//! - [`completion_rate`]: completion percentage
//! - [`HabitAnalyzer`]: per-habit stats and summaries
//! - [`Database`]: habit and completion persistence
//! - [`Config`]: application configuration management

pub mod completion_rate;
pub mod error;
pub mod habit;
pub mod period;
pub mod stats;
pub mod storage;
pub mod streak;

pub use completion_rate::{completion_rate, total_periods};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Completion, Habit, HabitUpdate, NewHabit};
pub use period::{period_end, period_of, period_start, previous_period_start, Cadence, Period};
pub use stats::{leaderboard, HabitAnalyzer, HabitStats, LeaderboardEntry, OverallStats, Participant};
pub use storage::{Config, Database};
pub use streak::{compute_streak, compute_streak_with_policy, StreakPolicy, StreakResult};
