use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::habit::{Category, Difficulty};

/// A named preset from which a habit can be created. Only descriptive
/// fields are copied; the new habit gets a fresh id, timestamp, and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitTemplate {
    pub id: Uuid,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub category: Category,
    pub difficulty: Difficulty,
}
