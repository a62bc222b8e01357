use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unlocked achievement. `id` is the stable catalog id; once persisted an
/// achievement is never removed or re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub badge: String,
    pub completed_date: DateTime<Utc>,
}
