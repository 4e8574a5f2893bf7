//! Facial analysis persistence. Rows are immutable once inserted; the
//! nested indicator groups serialize to JSON columns.

use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::FacialRecord;

use super::{fmt_ts, parse_ts, parse_uuid};

fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<FacialRecord, AppError> {
    let vitals: String = row.get("vital_estimates");
    let mental: String = row.get("mental_indicators");
    let physical: String = row.get("physical_indicators");
    let confidence: String = row.get("confidence_scores");
    Ok(FacialRecord {
        id: parse_uuid(row.get("id"))?,
        astronaut_id: row.get("astronaut_id"),
        timestamp: parse_ts(row.get("timestamp"))?,
        vital_estimates: serde_json::from_str(&vitals)?,
        mental_indicators: serde_json::from_str(&mental)?,
        physical_indicators: serde_json::from_str(&physical)?,
        confidence_scores: serde_json::from_str(&confidence)?,
        disclaimer: row.get("disclaimer"),
        created_at: parse_ts(row.get("created_at"))?,
    })
}

pub async fn insert(pool: &SqlitePool, record: &FacialRecord) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO facial_analyses (
            id, astronaut_id, timestamp, vital_estimates, mental_indicators,
            physical_indicators, confidence_scores, disclaimer, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(&record.astronaut_id)
    .bind(fmt_ts(record.timestamp))
    .bind(serde_json::to_string(&record.vital_estimates)?)
    .bind(serde_json::to_string(&record.mental_indicators)?)
    .bind(serde_json::to_string(&record.physical_indicators)?)
    .bind(serde_json::to_string(&record.confidence_scores)?)
    .bind(&record.disclaimer)
    .bind(fmt_ts(record.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent records first.
pub async fn history(
    pool: &SqlitePool,
    astronaut_id: &str,
    limit: i64,
) -> Result<Vec<FacialRecord>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM facial_analyses
        WHERE astronaut_id = ?
        ORDER BY timestamp DESC
        LIMIT ?
        "#,
    )
    .bind(astronaut_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_row).collect()
}

pub async fn latest(
    pool: &SqlitePool,
    astronaut_id: &str,
) -> Result<Option<FacialRecord>, AppError> {
    let row = sqlx::query(
        r#"
        SELECT * FROM facial_analyses
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    use crate::models::{MentalIndicators, PhysicalIndicators, VitalEstimates};
    use crate::store::test_pool;

    fn record(hr: Option<f64>, at: chrono::DateTime<Utc>) -> FacialRecord {
        FacialRecord {
            id: Uuid::new_v4(),
            astronaut_id: "AST-1".to_string(),
            timestamp: at,
            vital_estimates: VitalEstimates {
                heart_rate: hr,
                respiration_rate: Some(16.0),
                hrv_trend: None,
                oxygen_saturation_trend: None,
                blood_pressure_trend: None,
            },
            mental_indicators: MentalIndicators {
                mood_state: Some("calm".to_string()),
                mental_stress_index: Some(22.0),
                fatigue_probability: None,
                alertness_level: Some(0.8),
                facial_tension: None,
                pain_likelihood: None,
            },
            physical_indicators: PhysicalIndicators {
                blink_rate: Some(14.0),
                eye_openness: None,
                skin_hydration: None,
                dehydration_risk: None,
            },
            confidence_scores: HashMap::from([("overall".to_string(), 0.8)]),
            disclaimer: "All outputs are estimations, not medical diagnoses".to_string(),
            created_at: at,
        }
    }

    #[tokio::test]
    async fn nested_groups_round_trip_through_json_columns() {
        let pool = test_pool().await;
        let r = record(Some(71.0), Utc::now());
        insert(&pool, &r).await.unwrap();

        let stored = latest(&pool, "AST-1").await.unwrap().unwrap();
        assert_eq!(stored.vital_estimates.heart_rate, Some(71.0));
        assert_eq!(stored.mental_indicators.mood_state.as_deref(), Some("calm"));
        assert_eq!(stored.confidence_scores.get("overall"), Some(&0.8));
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let pool = test_pool().await;
        let now = Utc::now();
        insert(&pool, &record(Some(68.0), now - Duration::hours(3)))
            .await
            .unwrap();
        insert(&pool, &record(Some(74.0), now)).await.unwrap();

        let records = history(&pool, "AST-1", 50).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vital_estimates.heart_rate, Some(74.0));
    }
}
