//! Alert persistence and acknowledgment.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Alert, AlertSeverity, AlertStatus};

use super::{fmt_ts, parse_opt_ts, parse_ts, parse_uuid};

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Alert, AppError> {
    let severity_raw: String = row.get("severity");
    let status_raw: String = row.get("status");
    Ok(Alert {
        id: parse_uuid(row.get("id"))?,
        astronaut_id: row.get("astronaut_id"),
        severity: AlertSeverity::from_str(&severity_raw).map_err(AppError::Internal)?,
        message: row.get("message"),
        status: AlertStatus::from_str(&status_raw).map_err(AppError::Internal)?,
        created_at: parse_ts(row.get("created_at"))?,
        acknowledged_at: parse_opt_ts(row.get("acknowledged_at"))?,
        acknowledged_by: row.get("acknowledged_by"),
    })
}

pub async fn insert(pool: &SqlitePool, alert: &Alert) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO alerts (
            id, astronaut_id, severity, message, status,
            created_at, acknowledged_at, acknowledged_by
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(alert.id.to_string())
    .bind(&alert.astronaut_id)
    .bind(alert.severity.as_str())
    .bind(&alert.message)
    .bind(alert.status.as_str())
    .bind(fmt_ts(alert.created_at))
    .bind(alert.acknowledged_at.map(fmt_ts))
    .bind(&alert.acknowledged_by)
    .execute(pool)
    .await?;

    Ok(())
}

/// Newest alerts first, optionally filtered by status.
pub async fn list(
    pool: &SqlitePool,
    astronaut_id: &str,
    status: Option<AlertStatus>,
    limit: i64,
) -> Result<Vec<Alert>, AppError> {
    let rows = match status {
        Some(status) => {
            sqlx::query(
                r#"
                SELECT * FROM alerts
                WHERE astronaut_id = ? AND status = ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
            )
            .bind(astronaut_id)
            .bind(status.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT * FROM alerts
                WHERE astronaut_id = ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
            )
            .bind(astronaut_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    rows.iter().map(map_row).collect()
}

/// Move an alert to the requested state, stamping who acknowledged it and
/// when. Returns false when no row matched the id.
pub async fn acknowledge(
    pool: &SqlitePool,
    alert_id: Uuid,
    action: AlertStatus,
    acknowledged_by: &str,
    at: DateTime<Utc>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE alerts
        SET status = ?, acknowledged_at = ?, acknowledged_by = ?
        WHERE id = ?
        "#,
    )
    .bind(action.as_str())
    .bind(fmt_ts(at))
    .bind(acknowledged_by)
    .bind(alert_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
