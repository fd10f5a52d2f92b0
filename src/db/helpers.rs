use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveTime, Utc};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

/// Normalizes "9:05" / "09:05" to the zero-padded "HH:MM" form used as the
/// reminder lookup key.
pub fn normalize_time_of_day(value: &str) -> Result<String> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|err| anyhow!("invalid time of day '{value}': {err}"))?;
    Ok(time.format("%H:%M").to_string())
}

/// Surfaces an anyhow error from inside a rusqlite row mapper.
pub fn conversion_error(err: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            err.to_string(),
        )),
    )
}
