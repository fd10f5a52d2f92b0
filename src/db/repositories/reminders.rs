use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::{
    connection::Database,
    helpers::normalize_time_of_day,
    models::{Reminder, ReminderSeed},
};

impl Database {
    /// Inserts a reminder unless the same (time, message, language) triple is
    /// already stored. Returns whether a row was added.
    pub async fn insert_reminder(&self, seed: ReminderSeed) -> Result<bool> {
        let time = normalize_time_of_day(&seed.time)?;
        self.execute(move |conn| {
            let inserted = conn
                .execute(
                    "INSERT OR IGNORE INTO reminders (time, message, language) VALUES (?1, ?2, ?3)",
                    params![time, seed.message, seed.language],
                )
                .with_context(|| "failed to insert reminder")?;
            Ok(inserted > 0)
        })
        .await
    }

    /// Seeds configured reminders in one transaction. Returns how many were new.
    pub async fn seed_reminders(&self, seeds: Vec<ReminderSeed>) -> Result<usize> {
        let normalized = seeds
            .into_iter()
            .map(|seed| {
                Ok(ReminderSeed {
                    time: normalize_time_of_day(&seed.time)?,
                    ..seed
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open reminder seed transaction")?;
            let mut added = 0;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO reminders (time, message, language) VALUES (?1, ?2, ?3)",
                )?;
                for seed in &normalized {
                    added += stmt.execute(params![seed.time, seed.message, seed.language])?;
                }
            }
            tx.commit().context("failed to commit reminder seeds")?;
            Ok(added)
        })
        .await
    }

    pub async fn query_reminders(&self, time_of_day: &str) -> Result<Vec<Reminder>> {
        let time_of_day = time_of_day.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, time, message, language
                 FROM reminders
                 WHERE time = ?1
                 ORDER BY id ASC",
            )?;

            let reminders = stmt
                .query_map(params![time_of_day], |row| {
                    Ok(Reminder {
                        id: row.get("id")?,
                        time_of_day: row.get("time")?,
                        message: row.get("message")?,
                        language: row.get("language")?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(reminders)
        })
        .await
    }
}
