//! Vitals history rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted row per vitals tick. Never updated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthLogEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub heart_rate: i64,
    pub systolic: i64,
    pub diastolic: i64,
    pub is_critical: bool,
}

/// A health log row before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHealthLog {
    pub timestamp: DateTime<Utc>,
    pub heart_rate: i64,
    pub systolic: i64,
    pub diastolic: i64,
    pub is_critical: bool,
}
