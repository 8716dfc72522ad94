use clap::Subcommand;
use habitloop_core::{Config, Database, HabitAnalyzer, HabitStats, OverallStats};
use serde::Serialize;

use super::resolve_now;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Overall stats plus every habit
    Show {
        /// Evaluate as of this instant (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Stats for one habit
    Habit {
        /// Habit ID
        id: String,
        /// Evaluate as of this instant (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Serialize)]
struct StatsReport {
    stats: OverallStats,
    habits: Vec<HabitStats>,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let analyzer = HabitAnalyzer::with_policy(config.streak.policy);

    match action {
        StatsAction::Show { at } => {
            let now = resolve_now(&config, at.as_deref())?;
            let mut habits = Vec::new();
            for habit in db.list_habits()? {
                let completions = db.completion_times(&habit.id)?;
                habits.push(analyzer.analyze(&habit, &completions, &now));
            }
            let report = StatsReport {
                stats: analyzer.summarize(&habits),
                habits,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::Habit { id, at } => {
            let now = resolve_now(&config, at.as_deref())?;
            let habit = db.get_habit(&id)?;
            let completions = db.completion_times(&habit.id)?;
            let stats = analyzer.analyze(&habit, &completions, &now);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
