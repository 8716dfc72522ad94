//! Habit and completion records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::period::Cadence;

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// UUID v4
    pub id: String,
    pub name: String,
    pub category: String,
    pub cadence: Cadence,
    pub created_at: DateTime<Utc>,
}

/// A single "done" mark for a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: i64,
    pub habit_id: String,
    pub completed_at: DateTime<Utc>,
}

/// Input for creating a habit, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cadence: Cadence,
}

impl NewHabit {
    pub fn new(name: impl Into<String>, cadence: Cadence) -> Self {
        Self {
            name: name.into(),
            category: None,
            cadence,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Trim and check the name, fill in the default category, and build a
    /// habit with a fresh id.
    pub fn validate(
        self,
        max_name_len: usize,
        default_category: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Habit, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if name.chars().count() > max_name_len {
            return Err(ValidationError::NameTooLong { max: max_name_len });
        }

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_category.to_string());

        Ok(Habit {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            category,
            cadence: self.cadence,
            created_at,
        })
    }
}

/// Edits to an existing habit. Fields left as `None` keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cadence: Option<Cadence>,
}

impl HabitUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none() && self.cadence.is_none()
    }

    /// Merge the edits into `habit` and run them through the same checks as
    /// a new habit. The id and creation time are kept; a blank category
    /// leaves the existing one in place.
    pub fn apply(
        self,
        habit: &Habit,
        max_name_len: usize,
        default_category: &str,
    ) -> Result<Habit, ValidationError> {
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| habit.category.clone());
        let merged = NewHabit {
            name: self.name.unwrap_or_else(|| habit.name.clone()),
            category: Some(category),
            cadence: self.cadence.unwrap_or(habit.cadence),
        };

        let mut updated = merged.validate(max_name_len, default_category, habit.created_at)?;
        updated.id = habit.id.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_and_defaults_category() {
        let habit = NewHabit::new("  Read  ", Cadence::Daily)
            .validate(50, "General", Utc::now())
            .unwrap();
        assert_eq!(habit.name, "Read");
        assert_eq!(habit.category, "General");
        assert!(uuid::Uuid::parse_str(&habit.id).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_and_long_names() {
        let err = NewHabit::new("   ", Cadence::Daily)
            .validate(50, "General", Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);

        let err = NewHabit::new("x".repeat(51), Cadence::Weekly)
            .validate(50, "General", Utc::now())
            .unwrap_err();
        assert_eq!(err, ValidationError::NameTooLong { max: 50 });
    }

    #[test]
    fn test_explicit_category_kept() {
        let habit = NewHabit::new("Run", Cadence::Weekly)
            .with_category("Fitness")
            .validate(50, "General", Utc::now())
            .unwrap();
        assert_eq!(habit.category, "Fitness");
        assert_eq!(habit.cadence, Cadence::Weekly);
    }

    #[test]
    fn test_update_keeps_identity_and_unset_fields() {
        let habit = NewHabit::new("Run", Cadence::Daily)
            .with_category("Fitness")
            .validate(50, "General", Utc::now())
            .unwrap();

        let update = HabitUpdate {
            cadence: Some(Cadence::Weekly),
            category: Some("  ".to_string()),
            ..Default::default()
        };
        let updated = update.apply(&habit, 50, "General").unwrap();
        assert_eq!(updated.id, habit.id);
        assert_eq!(updated.created_at, habit.created_at);
        assert_eq!(updated.name, "Run");
        assert_eq!(updated.category, "Fitness");
        assert_eq!(updated.cadence, Cadence::Weekly);
    }

    #[test]
    fn test_update_validates_name() {
        let habit = NewHabit::new("Run", Cadence::Daily)
            .validate(50, "General", Utc::now())
            .unwrap();
        let update = HabitUpdate {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(update.apply(&habit, 50, "General").unwrap_err(), ValidationError::EmptyName);
        assert!(HabitUpdate::default().is_empty());
    }
}
