//! Handlers for telemetry ingestion and reading queries.
//!
//! Ingestion is soft-fail: an out-of-range reading is stored with its
//! derated confidence rather than rejected, and every ingest returns the
//! risk analysis computed against the astronaut's baseline.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::config::READING_FETCH_LIMIT;
use crate::error::AppError;
use crate::models::{HealthReading, ReadingInput, RiskAnalysis, ValidationReport};
use crate::scoring::{self, validation::validate_reading};
use crate::state::AppState;
use crate::store;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub record_id: Uuid,
    pub validation: ValidationReport,
    pub risk_analysis: RiskAnalysis,
}

/// Validate, persist, and score one reading. Shared by the ingest
/// endpoint and the simulation generator.
pub async fn process_reading(
    state: &AppState,
    input: ReadingInput,
) -> Result<IngestResponse, AppError> {
    let validation = validate_reading(&input);
    let now = Utc::now();

    let reading = HealthReading {
        id: Uuid::new_v4(),
        astronaut_id: input.astronaut_id,
        heart_rate: input.heart_rate,
        hrv: input.hrv,
        stress_level: input.stress_level,
        fatigue_level: input.fatigue_level,
        timestamp: input.timestamp.unwrap_or(now),
        confidence: validation.adjusted_confidence,
        source: input.source,
        validation: validation.clone(),
        created_at: now,
    };

    store::readings::insert(&state.db, &reading).await?;

    let risk_analysis =
        scoring::analyze_health_risk(&state.db, &reading.astronaut_id, &reading).await?;

    Ok(IngestResponse {
        success: true,
        record_id: reading.id,
        validation,
        risk_analysis,
    })
}

/// Handler for POST /api/health/ingest.
#[instrument(name = "health::ingest", skip(state, input), fields(astronaut_id = %input.astronaut_id, source = %input.source))]
pub async fn ingest(
    State(state): State<AppState>,
    Json(input): Json<ReadingInput>,
) -> Result<Json<IngestResponse>, AppError> {
    let response = process_reading(&state, input).await?;

    if !response.validation.is_valid {
        tracing::debug!(
            issues = response.validation.issues.len(),
            confidence = response.validation.adjusted_confidence,
            "Stored reading with derated confidence"
        );
    }

    Ok(Json(response))
}

/// Handler for GET /api/health/latest/{astronaut_id}.
#[instrument(name = "health::latest", skip(state))]
pub async fn latest(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
) -> Result<Json<Option<HealthReading>>, AppError> {
    let reading = store::readings::latest(&state.db, &astronaut_id).await?;
    Ok(Json(reading))
}

#[derive(Debug, Deserialize)]
pub struct TimelineParams {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DailyAverage {
    pub date: String,
    pub avg_hr: f64,
    pub avg_hrv: f64,
    pub avg_stress: f64,
    pub avg_fatigue: f64,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub records: Vec<HealthReading>,
    pub daily_averages: Vec<DailyAverage>,
    pub total_records: usize,
}

/// Handler for GET /api/health/timeline/{astronaut_id}.
#[instrument(name = "health::timeline", skip(state, params))]
pub async fn timeline(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
    Query(params): Query<TimelineParams>,
) -> Result<Json<TimelineResponse>, AppError> {
    let days = params.days.unwrap_or(7).max(1);
    let since = Utc::now() - Duration::days(days);

    let records =
        store::readings::since(&state.db, &astronaut_id, since, READING_FETCH_LIMIT).await?;
    let daily_averages = daily_averages(&records);

    Ok(Json(TimelineResponse {
        total_records: records.len(),
        daily_averages,
        records,
    }))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Bucket readings by UTC date and average each vital, rounded to one
/// decimal.
pub(crate) fn daily_averages(records: &[HealthReading]) -> Vec<DailyAverage> {
    let mut buckets: BTreeMap<String, Vec<&HealthReading>> = BTreeMap::new();
    for record in records {
        buckets
            .entry(record.timestamp.format("%Y-%m-%d").to_string())
            .or_default()
            .push(record);
    }

    buckets
        .into_iter()
        .map(|(date, readings)| {
            let n = readings.len() as f64;
            DailyAverage {
                date,
                avg_hr: round1(readings.iter().map(|r| r.heart_rate).sum::<f64>() / n),
                avg_hrv: round1(readings.iter().map(|r| r.hrv).sum::<f64>() / n),
                avg_stress: round1(readings.iter().map(|r| r.stress_level).sum::<f64>() / n),
                avg_fatigue: round1(readings.iter().map(|r| r.fatigue_level).sum::<f64>() / n),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(at: chrono::DateTime<Utc>, hr: f64, stress: f64) -> HealthReading {
        HealthReading {
            id: Uuid::new_v4(),
            astronaut_id: "AST-1".to_string(),
            heart_rate: hr,
            hrv: 50.0,
            stress_level: stress,
            fatigue_level: 20.0,
            timestamp: at,
            confidence: 0.9,
            source: "manual".to_string(),
            validation: ValidationReport {
                is_valid: true,
                issues: vec![],
                adjusted_confidence: 0.9,
                data_freshness: "current".to_string(),
            },
            created_at: at,
        }
    }

    #[test]
    fn averages_bucket_by_utc_date_and_round() {
        let day1_morning = Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap();
        let day1_evening = Utc.with_ymd_and_hms(2026, 8, 1, 20, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 8, 2, 9, 0, 0).unwrap();

        let records = vec![
            reading(day1_morning, 70.0, 30.0),
            reading(day1_evening, 75.5, 31.0),
            reading(day2, 68.0, 28.0),
        ];

        let averages = daily_averages(&records);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].date, "2026-08-01");
        // (70.0 + 75.5) / 2 = 72.75, rounds to 72.8
        assert_eq!(averages[0].avg_hr, 72.8);
        assert_eq!(averages[0].avg_stress, 30.5);
        assert_eq!(averages[1].date, "2026-08-02");
        assert_eq!(averages[1].avg_hr, 68.0);
    }

    #[test]
    fn empty_window_has_no_averages() {
        assert!(daily_averages(&[]).is_empty());
    }
}
