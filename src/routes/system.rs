//! System endpoints: liveness, astronaut roster, and the dashboard
//! aggregate.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::config::{
    ALERT_LIST_LIMIT, BASELINE_WINDOW_DAYS, PLACEHOLDER_ASTRONAUTS, READING_FETCH_LIMIT,
};
use crate::error::AppError;
use crate::models::{Alert, AlertStatus, Baseline, FacialRecord, HealthReading, MissionContext};
use crate::routes::context::initial_context;
use crate::routes::health_data::{daily_averages, DailyAverage};
use crate::scoring;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub system: &'static str,
}

/// Health check handler.
///
/// This is a liveness probe - it only checks that the process can
/// respond to HTTP, not that the store is reachable.
pub async fn health() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        system: "ASTRA-CARE",
    })
}

#[derive(Debug, Serialize)]
pub struct AstronautsResponse {
    pub astronauts: Vec<String>,
}

/// Handler for GET /api/astronauts. Lists identifiers that have
/// submitted telemetry, or the placeholder roster before any exists.
#[instrument(name = "system::astronauts", skip(state))]
pub async fn astronauts(
    State(state): State<AppState>,
) -> Result<Json<AstronautsResponse>, AppError> {
    let mut astronauts = store::readings::distinct_astronauts(&state.db, 100).await?;
    if astronauts.is_empty() {
        astronauts = PLACEHOLDER_ASTRONAUTS
            .iter()
            .map(|id| id.to_string())
            .collect();
    }
    Ok(Json(AstronautsResponse { astronauts }))
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub health: Option<HealthReading>,
    pub baseline: Baseline,
    pub context: MissionContext,
    pub timeline: Vec<DailyAverage>,
    pub alerts: Vec<Alert>,
    pub facial_analysis: Option<FacialRecord>,
    pub timestamp: String,
}

/// Handler for GET /api/dashboard/summary/{astronaut_id}.
///
/// One call that gathers everything the dashboard renders: the latest
/// reading, the baseline, the mission context, the 7-day timeline,
/// active alerts, and the latest facial analysis.
#[instrument(name = "system::dashboard", skip(state))]
pub async fn dashboard_summary(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
) -> Result<Json<DashboardSummary>, AppError> {
    let health = store::readings::latest(&state.db, &astronaut_id).await?;
    let baseline = scoring::ensure_baseline(&state.db, &astronaut_id).await?;
    let context = store::context::find(&state.db, &astronaut_id)
        .await?
        .unwrap_or_else(|| initial_context(&astronaut_id));

    let since = Utc::now() - Duration::days(BASELINE_WINDOW_DAYS);
    let window =
        store::readings::since(&state.db, &astronaut_id, since, READING_FETCH_LIMIT).await?;
    let timeline = daily_averages(&window);

    let alerts = store::alerts::list(
        &state.db,
        &astronaut_id,
        Some(AlertStatus::Active),
        ALERT_LIST_LIMIT,
    )
    .await?;
    let facial_analysis = store::facial::latest(&state.db, &astronaut_id).await?;

    Ok(Json(DashboardSummary {
        health,
        baseline,
        context,
        timeline,
        alerts,
        facial_analysis,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
