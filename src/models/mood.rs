use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One mood record per date, 1-5 scale. Writing the same date again
/// replaces the earlier entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub date: NaiveDate,
    pub mood: i32,
    pub note: Option<String>,
}
