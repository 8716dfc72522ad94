//! Habit management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use habitloop_core::{Cadence, Config, Database, HabitUpdate, NewHabit};

use super::resolve_now;

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Category (default from config)
        #[arg(long)]
        category: Option<String>,
        /// daily or weekly (default from config)
        #[arg(long)]
        cadence: Option<Cadence>,
    },
    /// List habits
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Change the name, category or cadence of a habit
    Edit {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
        /// daily or weekly
        #[arg(long)]
        cadence: Option<Cadence>,
    },
    /// Mark a habit done for the current period
    Complete {
        /// Habit ID
        id: String,
        /// Completion time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Undo the completion in the current period
    Undo {
        /// Habit ID
        id: String,
        /// Instant whose period is undone (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Delete a habit and its completions
    Remove {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        HabitAction::Add {
            name,
            category,
            cadence,
        } => {
            let mut new = NewHabit::new(name, cadence.unwrap_or(config.habits.default_cadence));
            if let Some(category) = category {
                new = new.with_category(category);
            }
            let habit = db.create_habit(new, &config.habits, Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { json } => {
            let habits = db.list_habits()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("no habits");
            } else {
                for habit in habits {
                    println!(
                        "{}  {:<7} {:<12} {}",
                        habit.id, habit.cadence, habit.category, habit.name
                    );
                }
            }
        }
        HabitAction::Edit {
            id,
            name,
            category,
            cadence,
        } => {
            let update = HabitUpdate {
                name,
                category,
                cadence,
            };
            if update.is_empty() {
                return Err("nothing to change: pass --name, --category or --cadence".into());
            }
            let habit = db.update_habit(&id, update, &config.habits)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Complete { id, at } => {
            let at = resolve_now(&config, at.as_deref())?;
            let completion = db.record_completion(&id, &at)?;
            println!("{}", serde_json::to_string_pretty(&completion)?);
        }
        HabitAction::Undo { id, at } => {
            let now = resolve_now(&config, at.as_deref())?;
            db.undo_completion(&id, &now)?;
            println!("completion undone");
        }
        HabitAction::Remove { id } => {
            db.delete_habit(&id)?;
            println!("habit removed");
        }
    }
    Ok(())
}
