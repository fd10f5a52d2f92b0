use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{conversion_error, parse_datetime},
    models::{AlertKind, AlertRecord, NewAlert},
};

fn row_to_alert(row: &Row) -> Result<AlertRecord, rusqlite::Error> {
    let timestamp: String = row.get("timestamp")?;
    let kind: Option<String> = row.get("kind")?;

    Ok(AlertRecord {
        id: row.get("id")?,
        timestamp: parse_datetime(&timestamp, "timestamp").map_err(conversion_error)?,
        message: row.get("message")?,
        kind: kind.as_deref().and_then(AlertKind::from_db),
    })
}

impl Database {
    pub async fn append_alert(&self, alert: NewAlert) -> Result<AlertRecord> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO alerts (timestamp, message, kind) VALUES (?1, ?2, ?3)",
                params![
                    alert.timestamp.to_rfc3339(),
                    alert.message,
                    alert.kind.as_str(),
                ],
            )
            .with_context(|| "failed to insert alert")?;

            Ok(AlertRecord {
                id: conn.last_insert_rowid(),
                timestamp: alert.timestamp,
                message: alert.message,
                kind: Some(alert.kind),
            })
        })
        .await
    }

    /// Most recent alerts, newest first.
    pub async fn list_alerts(&self, limit: u32) -> Result<Vec<AlertRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, message, kind
                 FROM alerts
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;

            let alerts = stmt
                .query_map(params![limit], row_to_alert)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(alerts)
        })
        .await
    }

    pub async fn count_alerts(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[tokio::test]
    async fn alerts_keep_kind_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("care.sqlite3")).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();

        db.append_alert(NewAlert {
            timestamp: at,
            message: "Inactivity detected for 5 minutes!".into(),
            kind: AlertKind::Inactivity,
        })
        .await
        .unwrap();
        db.append_alert(NewAlert {
            timestamp: at,
            message: "Critical health condition detected!".into(),
            kind: AlertKind::CriticalVitals,
        })
        .await
        .unwrap();

        let alerts = db.list_alerts(10).await.unwrap();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, Some(AlertKind::CriticalVitals));
        assert_eq!(alerts[1].message, "Inactivity detected for 5 minutes!");
        assert_eq!(alerts[1].timestamp, at);
        assert_eq!(db.count_alerts().await.unwrap(), 2);
    }
}
