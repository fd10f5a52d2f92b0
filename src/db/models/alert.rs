//! Escalation alert rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Inactivity,
    CriticalVitals,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Inactivity => "inactivity",
            AlertKind::CriticalVitals => "critical_vitals",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "inactivity" => Some(AlertKind::Inactivity),
            "critical_vitals" => Some(AlertKind::CriticalVitals),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// `None` for rows written before the kind column existed.
    pub kind: Option<AlertKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub kind: AlertKind,
}
