//! Health reading persistence. Rows are immutable once inserted.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::HealthReading;

use super::{fmt_ts, parse_ts, parse_uuid};

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<HealthReading, AppError> {
    let validation_raw: String = row.get("validation");
    Ok(HealthReading {
        id: parse_uuid(row.get("id"))?,
        astronaut_id: row.get("astronaut_id"),
        heart_rate: row.get("heart_rate"),
        hrv: row.get("hrv"),
        stress_level: row.get("stress_level"),
        fatigue_level: row.get("fatigue_level"),
        timestamp: parse_ts(row.get("timestamp"))?,
        confidence: row.get("confidence"),
        source: row.get("source"),
        validation: serde_json::from_str(&validation_raw)?,
        created_at: parse_ts(row.get("created_at"))?,
    })
}

pub async fn insert(pool: &SqlitePool, reading: &HealthReading) -> Result<(), AppError> {
    let validation = serde_json::to_string(&reading.validation)?;

    sqlx::query(
        r#"
        INSERT INTO health_readings (
            id, astronaut_id, heart_rate, hrv, stress_level, fatigue_level,
            timestamp, confidence, source, validation, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(reading.id.to_string())
    .bind(&reading.astronaut_id)
    .bind(reading.heart_rate)
    .bind(reading.hrv)
    .bind(reading.stress_level)
    .bind(reading.fatigue_level)
    .bind(fmt_ts(reading.timestamp))
    .bind(reading.confidence)
    .bind(&reading.source)
    .bind(validation)
    .bind(fmt_ts(reading.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// The most recent reading for an astronaut, by reading timestamp.
pub async fn latest(
    pool: &SqlitePool,
    astronaut_id: &str,
) -> Result<Option<HealthReading>, AppError> {
    let row = sqlx::query(
        r#"
        SELECT * FROM health_readings
        WHERE astronaut_id = ?
        ORDER BY timestamp DESC
        LIMIT 1
        "#,
    )
    .bind(astronaut_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(map_row).transpose()
}

/// Readings since the given instant, oldest first.
pub async fn since(
    pool: &SqlitePool,
    astronaut_id: &str,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<HealthReading>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM health_readings
        WHERE astronaut_id = ? AND timestamp >= ?
        ORDER BY timestamp ASC
        LIMIT ?
        "#,
    )
    .bind(astronaut_id)
    .bind(fmt_ts(since))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_row).collect()
}

/// Distinct astronaut identifiers that have submitted telemetry.
pub async fn distinct_astronauts(pool: &SqlitePool, limit: i64) -> Result<Vec<String>, AppError> {
    let rows = sqlx::query(
        "SELECT DISTINCT astronaut_id FROM health_readings ORDER BY astronaut_id LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|row| row.get("astronaut_id")).collect())
}
