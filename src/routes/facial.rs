//! Handlers for camera-derived facial analysis records.
//!
//! Analysis results are estimations, never diagnoses; every stored
//! record carries the disclaimer. A scan that produced both a heart-rate
//! estimate and a stress index also synthesizes a regular health reading
//! so the scan shows up in baselines and on the dashboard.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::config::FACIAL_HISTORY_LIMIT;
use crate::error::AppError;
use crate::models::{
    FacialRecord, HealthReading, MentalIndicators, PhysicalIndicators, ValidationReport,
    VitalEstimates,
};
use crate::state::AppState;
use crate::store;

/// Attached to every stored analysis.
const DISCLAIMER: &str = "All outputs are estimations, not medical diagnoses";

/// Confidence assigned to a synthesized reading when the scan reported no
/// overall figure.
const SYNTHESIZED_CONFIDENCE: f64 = 0.75;

/// HRV substituted when the scan carried no trend estimate.
const SYNTHESIZED_HRV: f64 = 50.0;

/// Fatigue substituted when the scan carried no probability estimate.
const SYNTHESIZED_FATIGUE: f64 = 30.0;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub astronaut_id: String,
    pub estimated_hr: Option<f64>,
    pub respiration_rate: Option<f64>,
    pub hrv_trend: Option<f64>,
    pub oxygen_saturation_trend: Option<f64>,
    pub blood_pressure_trend: Option<String>,
    pub mood_state: Option<String>,
    pub mental_stress_index: Option<f64>,
    pub fatigue_probability: Option<f64>,
    pub alertness_level: Option<f64>,
    pub facial_tension: Option<f64>,
    pub pain_likelihood: Option<f64>,
    pub blink_rate: Option<f64>,
    pub eye_openness: Option<f64>,
    pub skin_hydration_indicator: Option<String>,
    pub dehydration_risk: Option<f64>,
    pub confidence_scores: Option<HashMap<String, f64>>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub mood: Option<String>,
    pub stress_index: Option<f64>,
    pub fatigue: Option<f64>,
    pub alertness: Option<f64>,
    pub heart_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub record_id: Uuid,
    pub analysis_summary: AnalysisSummary,
    pub integrated_to_dashboard: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub records: Vec<FacialRecord>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

/// Handler for POST /api/facial/analyze.
#[instrument(name = "facial::analyze", skip(state, request), fields(astronaut_id = %request.astronaut_id))]
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let now = Utc::now();
    let confidence_scores = request.confidence_scores.unwrap_or_default();

    let record = FacialRecord {
        id: Uuid::new_v4(),
        astronaut_id: request.astronaut_id.clone(),
        timestamp: request.timestamp.unwrap_or(now),
        vital_estimates: VitalEstimates {
            heart_rate: request.estimated_hr,
            respiration_rate: request.respiration_rate,
            hrv_trend: request.hrv_trend,
            oxygen_saturation_trend: request.oxygen_saturation_trend,
            blood_pressure_trend: request.blood_pressure_trend,
        },
        mental_indicators: MentalIndicators {
            mood_state: request.mood_state.clone(),
            mental_stress_index: request.mental_stress_index,
            fatigue_probability: request.fatigue_probability,
            alertness_level: request.alertness_level,
            facial_tension: request.facial_tension,
            pain_likelihood: request.pain_likelihood,
        },
        physical_indicators: PhysicalIndicators {
            blink_rate: request.blink_rate,
            eye_openness: request.eye_openness,
            skin_hydration: request.skin_hydration_indicator,
            dehydration_risk: request.dehydration_risk,
        },
        confidence_scores: confidence_scores.clone(),
        disclaimer: DISCLAIMER.to_string(),
        created_at: now,
    };

    store::facial::insert(&state.db, &record).await?;

    // A scan with both a heart-rate estimate and a stress index feeds the
    // regular telemetry stream.
    let integrated = match (request.estimated_hr, request.mental_stress_index) {
        (Some(heart_rate), Some(stress_level)) => {
            let confidence = confidence_scores
                .get("overall")
                .copied()
                .unwrap_or(SYNTHESIZED_CONFIDENCE);
            let synthesized = HealthReading {
                id: Uuid::new_v4(),
                astronaut_id: request.astronaut_id.clone(),
                heart_rate,
                hrv: request.hrv_trend.unwrap_or(SYNTHESIZED_HRV),
                stress_level,
                fatigue_level: request.fatigue_probability.unwrap_or(SYNTHESIZED_FATIGUE),
                timestamp: now,
                confidence,
                source: "facial_scan".to_string(),
                validation: ValidationReport {
                    is_valid: true,
                    issues: vec![],
                    adjusted_confidence: confidence,
                    data_freshness: "current".to_string(),
                },
                created_at: now,
            };
            store::readings::insert(&state.db, &synthesized).await?;
            true
        }
        _ => false,
    };

    Ok(Json(AnalyzeResponse {
        success: true,
        record_id: record.id,
        analysis_summary: AnalysisSummary {
            mood: request.mood_state,
            stress_index: request.mental_stress_index,
            fatigue: request.fatigue_probability,
            alertness: request.alertness_level,
            heart_rate: request.estimated_hr,
        },
        integrated_to_dashboard: integrated,
    }))
}

/// Handler for GET /api/facial/history/{astronaut_id}.
#[instrument(name = "facial::history", skip(state, params))]
pub async fn history(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = params.limit.unwrap_or(FACIAL_HISTORY_LIMIT).clamp(1, FACIAL_HISTORY_LIMIT);
    let records = store::facial::history(&state.db, &astronaut_id, limit).await?;
    Ok(Json(HistoryResponse { records }))
}

/// Handler for GET /api/facial/latest/{astronaut_id}.
#[instrument(name = "facial::latest", skip(state))]
pub async fn latest(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
) -> Result<Json<Option<FacialRecord>>, AppError> {
    let record = store::facial::latest(&state.db, &astronaut_id).await?;
    Ok(Json(record))
}
