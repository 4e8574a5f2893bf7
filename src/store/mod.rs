//! SQLite persistence layer.
//!
//! One submodule per collection. Rows key on application-level UUIDs
//! stored as TEXT; timestamps are fixed-width RFC 3339 TEXT so that
//! lexicographic ordering matches chronological ordering; nested
//! indicator groups serialize to JSON columns. The schema is created
//! idempotently at startup.

pub mod alerts;
pub mod baselines;
pub mod chat;
pub mod context;
pub mod facial;
pub mod readings;
pub mod users;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Complete schema. `IF NOT EXISTS` keeps startup idempotent.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL,
    astronaut_id TEXT NOT NULL,
    avatar_url TEXT,
    created_at TEXT NOT NULL,
    last_login TEXT
);

CREATE TABLE IF NOT EXISTS health_readings (
    id TEXT PRIMARY KEY,
    astronaut_id TEXT NOT NULL,
    heart_rate REAL NOT NULL,
    hrv REAL NOT NULL,
    stress_level REAL NOT NULL,
    fatigue_level REAL NOT NULL,
    timestamp TEXT NOT NULL,
    confidence REAL NOT NULL,
    source TEXT NOT NULL,
    validation TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_readings_astronaut_timestamp
    ON health_readings (astronaut_id, timestamp);

CREATE TABLE IF NOT EXISTS facial_analyses (
    id TEXT PRIMARY KEY,
    astronaut_id TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    vital_estimates TEXT NOT NULL,
    mental_indicators TEXT NOT NULL,
    physical_indicators TEXT NOT NULL,
    confidence_scores TEXT NOT NULL,
    disclaimer TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_facial_astronaut_timestamp
    ON facial_analyses (astronaut_id, timestamp);

CREATE TABLE IF NOT EXISTS baselines (
    id TEXT PRIMARY KEY,
    astronaut_id TEXT NOT NULL UNIQUE,
    hr_baseline REAL NOT NULL,
    hr_std REAL NOT NULL,
    hrv_baseline REAL NOT NULL,
    hrv_std REAL NOT NULL,
    stress_baseline REAL NOT NULL,
    fatigue_baseline REAL NOT NULL,
    data_points INTEGER NOT NULL,
    is_default INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mission_contexts (
    id TEXT PRIMARY KEY,
    astronaut_id TEXT NOT NULL UNIQUE,
    mission_phase TEXT NOT NULL,
    time_of_day TEXT NOT NULL,
    work_cycle TEXT NOT NULL,
    days_since_launch INTEGER NOT NULL,
    current_workload TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY,
    astronaut_id TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    acknowledged_at TEXT,
    acknowledged_by TEXT
);

CREATE INDEX IF NOT EXISTS idx_alerts_astronaut_status
    ON alerts (astronaut_id, status);

CREATE TABLE IF NOT EXISTS chat_messages (
    id TEXT PRIMARY KEY,
    astronaut_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    user_message TEXT NOT NULL,
    assistant_response TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chat_session_timestamp
    ON chat_messages (session_id, timestamp);
"#;

/// Open the connection pool, creating the database file if missing.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create all tables and indexes.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

/// Format a timestamp for storage: fixed-width microseconds, Z suffix.
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Malformed stored timestamp '{raw}': {e}")))
}

pub(crate) fn parse_opt_ts(raw: Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    raw.as_deref().map(parse_ts).transpose()
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|e| AppError::Internal(format!("Malformed stored record id '{raw}': {e}")))
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    init_schema(&pool).await.expect("schema");
    pool
}
