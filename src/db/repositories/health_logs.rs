use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{conversion_error, parse_datetime},
    models::{HealthLogEntry, NewHealthLog},
};

fn row_to_health_log(row: &Row) -> Result<HealthLogEntry, rusqlite::Error> {
    let timestamp: String = row.get("timestamp")?;

    Ok(HealthLogEntry {
        id: row.get("id")?,
        timestamp: parse_datetime(&timestamp, "timestamp").map_err(conversion_error)?,
        heart_rate: row.get("heart_rate")?,
        systolic: row.get("bp_systolic")?,
        diastolic: row.get("bp_diastolic")?,
        is_critical: row.get::<_, i64>("is_critical")? != 0,
    })
}

impl Database {
    /// Appends one vitals history row and returns it with its assigned id.
    pub async fn append_health_log(&self, entry: NewHealthLog) -> Result<HealthLogEntry> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO health_logs (timestamp, heart_rate, bp_systolic, bp_diastolic, is_critical)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.timestamp.to_rfc3339(),
                    entry.heart_rate,
                    entry.systolic,
                    entry.diastolic,
                    entry.is_critical as i64,
                ],
            )
            .with_context(|| "failed to insert health log")?;

            Ok(HealthLogEntry {
                id: conn.last_insert_rowid(),
                timestamp: entry.timestamp,
                heart_rate: entry.heart_rate,
                systolic: entry.systolic,
                diastolic: entry.diastolic,
                is_critical: entry.is_critical,
            })
        })
        .await
    }

    /// Most recent health logs, newest first.
    pub async fn list_health_logs(&self, limit: u32) -> Result<Vec<HealthLogEntry>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, heart_rate, bp_systolic, bp_diastolic, is_critical
                 FROM health_logs
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;

            let logs = stmt
                .query_map(params![limit], row_to_health_log)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(logs)
        })
        .await
    }

    pub async fn count_health_logs(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM health_logs", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}
