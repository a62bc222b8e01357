use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A tracked habit with its per-date completion log.
///
/// `logs` holds only explicit records; a date absent from the map is
/// unrecorded. `notes` keys may appear without a matching log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub logs: BTreeMap<NaiveDate, LogEntry>,
    #[serde(default)]
    pub notes: BTreeMap<NaiveDate, String>,
    #[serde(default)]
    pub is_archived: bool,
}

impl Habit {
    /// Tri-state view of one date's log.
    pub fn log_status(&self, date: NaiveDate) -> LogStatus {
        match self.logs.get(&date) {
            None => LogStatus::Unset,
            Some(LogEntry::Completed) => LogStatus::Completed,
            Some(LogEntry::Skipped) => LogStatus::Skipped,
        }
    }

    /// Count of days explicitly marked completed over the whole history.
    pub fn total_completions(&self) -> u32 {
        self.logs
            .values()
            .filter(|e| **e == LogEntry::Completed)
            .count() as u32
    }
}

/// An explicit per-date record. Absence from `Habit::logs` is the third
/// state (unrecorded) — see [`LogStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEntry {
    Completed,
    Skipped,
}

/// Full tri-state of a (habit, date) pair. `Unset` means no record exists;
/// `Skipped` means the day was tracked and explicitly failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Unset,
    Completed,
    Skipped,
}

impl LogStatus {
    /// The toggle cycle: unrecorded → completed → skipped → unrecorded.
    pub fn toggled(self) -> LogStatus {
        match self {
            LogStatus::Unset => LogStatus::Completed,
            LogStatus::Completed => LogStatus::Skipped,
            LogStatus::Skipped => LogStatus::Unset,
        }
    }

    /// The map entry this status corresponds to, if any.
    pub fn as_entry(self) -> Option<LogEntry> {
        match self {
            LogStatus::Unset => None,
            LogStatus::Completed => Some(LogEntry::Completed),
            LogStatus::Skipped => Some(LogEntry::Skipped),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Health,
    Fitness,
    Mindfulness,
    Productivity,
    Learning,
    Social,
    Finance,
}

impl Default for Category {
    fn default() -> Self {
        Self::General
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::General => "general",
            Category::Health => "health",
            Category::Fitness => "fitness",
            Category::Mindfulness => "mindfulness",
            Category::Productivity => "productivity",
            Category::Learning => "learning",
            Category::Social => "social",
            Category::Finance => "finance",
        };
        f.write_str(s)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Category::General),
            "health" => Ok(Category::Health),
            "fitness" => Ok(Category::Fitness),
            "mindfulness" => Ok(Category::Mindfulness),
            "productivity" => Ok(Category::Productivity),
            "learning" => Ok(Category::Learning),
            "social" => Ok(Category::Social),
            "finance" => Ok(Category::Finance),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(s)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Request payload for creating a habit. Unset classification fields fall
/// back to `general` / `medium`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateHabit {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

/// Partial update: `None` fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateHabit {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
    pub is_archived: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_cycle_has_length_three() {
        let start = LogStatus::Unset;
        assert_eq!(start.toggled(), LogStatus::Completed);
        assert_eq!(start.toggled().toggled(), LogStatus::Skipped);
        assert_eq!(start.toggled().toggled().toggled(), LogStatus::Unset);
    }

    #[test]
    fn log_status_distinguishes_skipped_from_unset() {
        let mut habit = Habit {
            id: Uuid::new_v4(),
            name: "Read".into(),
            emoji: "📚".into(),
            color: "#6366f1".into(),
            category: Category::default(),
            difficulty: Difficulty::default(),
            created_at: Utc::now(),
            logs: BTreeMap::new(),
            notes: BTreeMap::new(),
            is_archived: false,
        };
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(habit.log_status(d), LogStatus::Unset);

        habit.logs.insert(d, LogEntry::Skipped);
        assert_eq!(habit.log_status(d), LogStatus::Skipped);
        assert_eq!(habit.total_completions(), 0);
    }

    #[test]
    fn logs_round_trip_through_json_with_date_keys() {
        let mut logs = BTreeMap::new();
        logs.insert(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            LogEntry::Completed,
        );
        logs.insert(
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            LogEntry::Skipped,
        );

        let json = serde_json::to_string(&logs).unwrap();
        assert!(json.contains("\"2024-03-01\":\"completed\""));

        let back: BTreeMap<NaiveDate, LogEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, logs);
    }
}
