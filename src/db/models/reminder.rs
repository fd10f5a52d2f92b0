//! Scheduled reminder rows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    /// Local wall-clock minute, "HH:MM".
    pub time_of_day: String,
    pub message: String,
    pub language: String,
}

/// Reminder as it appears in configuration, before seeding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSeed {
    pub time: String,
    pub message: String,
    pub language: String,
}
