pub mod alert;
pub mod health_log;
pub mod reminder;

pub use alert::{AlertKind, AlertRecord, NewAlert};
pub use health_log::{HealthLogEntry, NewHealthLog};
pub use reminder::{Reminder, ReminderSeed};
