//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Habits and their cadence
//! - Completion marks, at most one per habit per period

use std::path::Path;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::config::HabitsConfig;
use super::{data_dir, migrations};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::habit::{Completion, Habit, HabitUpdate, NewHabit};
use crate::period::{period_of, Cadence};

/// SQLite database for habits and completions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/habitloop/habitloop.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_path(data_dir()?.join("habitloop.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(DatabaseError::from)?;
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Validate and insert a new habit.
    ///
    /// # Errors
    /// Returns a validation error for a blank, too long or duplicate name.
    pub fn create_habit(
        &self,
        new: NewHabit,
        settings: &HabitsConfig,
        created_at: DateTime<Utc>,
    ) -> Result<Habit> {
        let habit = new.validate(settings.max_name_len, &settings.default_category, created_at)?;
        if self.name_taken(&habit.name, None)? {
            return Err(ValidationError::DuplicateHabit { name: habit.name }.into());
        }

        self.conn.execute(
            "INSERT INTO habits (id, name, category, cadence, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                habit.id,
                habit.name,
                habit.category,
                habit.cadence.as_str(),
                encode_time(&habit.created_at),
            ],
        )?;
        tracing::info!(habit_id = %habit.id, name = %habit.name, cadence = %habit.cadence, "created habit");
        Ok(habit)
    }

    /// Edit the name, category or cadence of a habit.
    ///
    /// Existing completions are kept; stats computed afterwards bucket them
    /// by the new cadence.
    ///
    /// # Errors
    /// Returns a validation error for an unknown id, or a blank, too long or
    /// duplicate name.
    pub fn update_habit(
        &self,
        id: &str,
        update: HabitUpdate,
        settings: &HabitsConfig,
    ) -> Result<Habit> {
        let current = self.get_habit(id)?;
        let habit = update.apply(&current, settings.max_name_len, &settings.default_category)?;
        if self.name_taken(&habit.name, Some(&habit.id))? {
            return Err(ValidationError::DuplicateHabit { name: habit.name }.into());
        }

        self.conn.execute(
            "UPDATE habits SET name = ?2, category = ?3, cadence = ?4 WHERE id = ?1",
            params![habit.id, habit.name, habit.category, habit.cadence.as_str()],
        )?;
        tracing::info!(habit_id = %habit.id, name = %habit.name, cadence = %habit.cadence, "updated habit");
        Ok(habit)
    }

    /// Whether another habit already uses `name`, ignoring case.
    fn name_taken(&self, name: &str, except_id: Option<&str>) -> Result<bool> {
        let taken: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM habits WHERE name = ?1 COLLATE NOCASE AND id IS NOT ?2)",
            params![name, except_id],
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    /// Fetch a habit by id.
    pub fn get_habit(&self, id: &str) -> Result<Habit> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, category, cadence, created_at FROM habits WHERE id = ?1",
                params![id],
                read_habit_row,
            )
            .optional()?;
        match row {
            Some(row) => decode_habit(row),
            None => Err(ValidationError::HabitNotFound { id: id.to_string() }.into()),
        }
    }

    /// All habits, newest first.
    pub fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category, cadence, created_at
             FROM habits
             ORDER BY created_at DESC, name ASC",
        )?;
        let rows = stmt.query_map([], read_habit_row)?;

        let mut habits = Vec::new();
        for row in rows {
            habits.push(decode_habit(row?)?);
        }
        Ok(habits)
    }

    /// Delete a habit and all of its completions.
    pub fn delete_habit(&self, id: &str) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(ValidationError::HabitNotFound { id: id.to_string() }.into());
        }
        tracing::info!(habit_id = %id, "deleted habit");
        Ok(())
    }

    /// Completion records of a habit, newest first.
    pub fn completions_for(&self, habit_id: &str) -> Result<Vec<Completion>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, completed_at
             FROM completions
             WHERE habit_id = ?1
             ORDER BY completed_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![habit_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut completions = Vec::new();
        for row in rows {
            let (id, habit_id, completed_at) = row?;
            completions.push(Completion {
                id,
                habit_id,
                completed_at: decode_time("completions", &completed_at)?,
            });
        }
        Ok(completions)
    }

    /// Just the completion instants of a habit, newest first.
    pub fn completion_times(&self, habit_id: &str) -> Result<Vec<DateTime<Utc>>> {
        Ok(self
            .completions_for(habit_id)?
            .into_iter()
            .map(|c| c.completed_at)
            .collect())
    }

    /// Mark a habit done at `at`.
    ///
    /// Period boundaries are taken in `at`'s time zone.
    ///
    /// # Errors
    /// Returns [`ValidationError::AlreadyCompleted`] if the habit already has
    /// a completion in that period.
    pub fn record_completion<Tz: TimeZone>(
        &self,
        habit_id: &str,
        at: &DateTime<Tz>,
    ) -> Result<Completion> {
        let habit = self.get_habit(habit_id)?;
        if self.find_in_period(&habit, at)?.is_some() {
            return Err(ValidationError::AlreadyCompleted {
                period: habit.cadence.current_period_label(),
            }
            .into());
        }

        let completed_at = at.with_timezone(&Utc);
        self.conn.execute(
            "INSERT INTO completions (habit_id, completed_at) VALUES (?1, ?2)",
            params![habit.id, encode_time(&completed_at)],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(habit_id = %habit.id, completion_id = id, "recorded completion");

        Ok(Completion {
            id,
            habit_id: habit.id,
            completed_at,
        })
    }

    /// Remove the completion that falls in `now`'s period.
    ///
    /// # Errors
    /// Returns [`ValidationError::NoCompletionInPeriod`] if there is none.
    pub fn undo_completion<Tz: TimeZone>(
        &self,
        habit_id: &str,
        now: &DateTime<Tz>,
    ) -> Result<Completion> {
        let habit = self.get_habit(habit_id)?;
        let completion = self
            .find_in_period(&habit, now)?
            .ok_or(ValidationError::NoCompletionInPeriod)?;

        self.conn
            .execute("DELETE FROM completions WHERE id = ?1", params![completion.id])?;
        tracing::info!(habit_id = %habit.id, completion_id = completion.id, "undid completion");
        Ok(completion)
    }

    fn find_in_period<Tz: TimeZone>(
        &self,
        habit: &Habit,
        at: &DateTime<Tz>,
    ) -> Result<Option<Completion>> {
        let period = period_of(at, habit.cadence);
        Ok(self
            .completions_for(&habit.id)?
            .into_iter()
            .find(|c| period.contains(&c.completed_at)))
    }
}

type HabitRow = (String, String, String, String, String);

fn read_habit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_habit((id, name, category, cadence, created_at): HabitRow) -> Result<Habit> {
    let cadence: Cadence = cadence.parse().map_err(|message| DatabaseError::CorruptRow {
        table: "habits",
        message,
    })?;
    Ok(Habit {
        id,
        name,
        category,
        cadence,
        created_at: decode_time("habits", &created_at)?,
    })
}

fn encode_time(t: &DateTime<Utc>) -> String {
    // fixed width so text ordering matches time ordering
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_time(table: &'static str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            DatabaseError::CorruptRow {
                table,
                message: format!("bad timestamp '{raw}': {e}"),
            }
            .into()
        })
}
