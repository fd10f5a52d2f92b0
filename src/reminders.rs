use anyhow::Result;
use chrono::{DateTime, Duration, Local, Timelike};

use crate::db::{Database, Reminder};

/// Minutes looked back when ticks skip over one or more minutes. Longer gaps
/// (suspend, large clock jumps) only replay the most recent minutes.
const MAX_CATCH_UP_MINUTES: i64 = 5;

/// Matches local wall-clock minutes against stored reminders. Every minute
/// between the previous tick and this one is checked exactly once, so tick
/// jitter across a minute boundary cannot skip a reminder and a sub-minute
/// tick cannot repeat one.
pub struct ReminderSource {
    last_checked: Option<DateTime<Local>>,
}

impl ReminderSource {
    pub fn new() -> Self {
        Self { last_checked: None }
    }

    /// Reminders due in the minutes since the previous call, up to and
    /// including the minute of `now`.
    pub async fn due(&mut self, db: &Database, now: DateTime<Local>) -> Result<Vec<Reminder>> {
        let minute = truncate_to_minute(now);
        let first = match self.last_checked {
            None => minute,
            // Same minute, or the clock stepped back: already handled.
            Some(last) if minute <= last => return Ok(Vec::new()),
            Some(last) => {
                let earliest = minute - Duration::minutes(MAX_CATCH_UP_MINUTES - 1);
                (last + Duration::minutes(1)).max(earliest)
            }
        };

        let mut due = Vec::new();
        let mut cursor = first;
        while cursor <= minute {
            due.extend(db.query_reminders(&time_of_day(cursor)).await?);
            cursor += Duration::minutes(1);
        }

        self.last_checked = Some(minute);
        Ok(due)
    }
}

impl Default for ReminderSource {
    fn default() -> Self {
        Self::new()
    }
}

pub fn time_of_day(now: DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}

fn truncate_to_minute(at: DateTime<Local>) -> DateTime<Local> {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::ReminderSeed;

    async fn db_with_reminder(dir: &tempfile::TempDir) -> Database {
        let db = Database::new(dir.path().join("care.sqlite3")).unwrap();
        db.insert_reminder(ReminderSeed {
            time: "14:30".into(),
            message: "Take your medicine".into(),
            language: "en".into(),
        })
        .await
        .unwrap();
        db
    }

    fn local(hour: u32, minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, 16, hour, minute, second)
            .earliest()
            .unwrap()
    }

    #[tokio::test]
    async fn fires_in_matching_minute_only() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with_reminder(&dir).await;

        let mut source = ReminderSource::new();
        let due = source.due(&db, local(14, 30, 5)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].message, "Take your medicine");

        let mut source = ReminderSource::new();
        assert!(source.due(&db, local(14, 31, 0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_tick_in_same_minute_is_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with_reminder(&dir).await;
        let mut source = ReminderSource::new();

        assert_eq!(source.due(&db, local(14, 30, 0)).await.unwrap().len(), 1);
        assert!(source.due(&db, local(14, 30, 30)).await.unwrap().is_empty());
        assert!(source.due(&db, local(14, 31, 0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fires_again_next_day() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with_reminder(&dir).await;
        let mut source = ReminderSource::new();

        assert_eq!(source.due(&db, local(14, 30, 0)).await.unwrap().len(), 1);
        let tomorrow = local(14, 30, 0) + Duration::days(1);
        assert_eq!(source.due(&db, tomorrow).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tick_straddling_the_minute_still_fires() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with_reminder(&dir).await;
        let mut source = ReminderSource::new();

        let before = local(14, 29, 59) + Duration::milliseconds(999);
        let after = local(14, 31, 0) + Duration::milliseconds(1);

        let first = source.due(&db, before).await.unwrap();
        let second = source.due(&db, after).await.unwrap();
        assert_eq!(first.len() + second.len(), 1);
        assert_eq!(second[0].message, "Take your medicine");
    }

    #[tokio::test]
    async fn long_gap_only_replays_recent_minutes() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with_reminder(&dir).await;
        let mut source = ReminderSource::new();

        assert!(source.due(&db, local(9, 0, 0)).await.unwrap().is_empty());
        assert_eq!(source.due(&db, local(14, 34, 0)).await.unwrap().len(), 1);

        let mut late = ReminderSource::new();
        assert!(late.due(&db, local(9, 0, 0)).await.unwrap().is_empty());
        assert!(late.due(&db, local(14, 35, 0)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clock_stepping_back_does_not_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_with_reminder(&dir).await;
        let mut source = ReminderSource::new();

        assert_eq!(source.due(&db, local(14, 30, 0)).await.unwrap().len(), 1);
        assert!(source.due(&db, local(14, 29, 0)).await.unwrap().is_empty());
        assert!(source.due(&db, local(14, 30, 10)).await.unwrap().is_empty());
    }
}
