use serde::{Deserialize, Serialize};

/// A challenge the user has started. `is_active` is flipped by explicit
/// start/complete actions, never derived from habit logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub is_active: bool,
}
