mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{AlertKind, AlertRecord, HealthLogEntry, NewAlert, NewHealthLog, Reminder, ReminderSeed};
