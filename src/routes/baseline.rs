//! Handlers for baseline retrieval and recalibration.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::models::Baseline;
use crate::scoring;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct RecalibrateParams {
    pub astronaut_id: String,
}

#[derive(Debug, Serialize)]
pub struct RecalibrateResponse {
    pub success: bool,
    pub baseline: Baseline,
}

/// Handler for GET /api/baseline/{astronaut_id}.
///
/// Computes and caches a baseline on first access; afterwards the stored
/// row is served until the next recalibration.
#[instrument(name = "baseline::get", skip(state))]
pub async fn get_baseline(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
) -> Result<Json<Baseline>, AppError> {
    let baseline = scoring::ensure_baseline(&state.db, &astronaut_id).await?;
    Ok(Json(baseline))
}

/// Handler for POST /api/baseline/recalibrate.
///
/// Recomputes from the trailing window and overwrites the stored row.
/// Idempotent: identical input data reproduces identical statistics.
#[instrument(name = "baseline::recalibrate", skip(state, params), fields(astronaut_id = %params.astronaut_id))]
pub async fn recalibrate(
    State(state): State<AppState>,
    Query(params): Query<RecalibrateParams>,
) -> Result<Json<RecalibrateResponse>, AppError> {
    let baseline = scoring::compute_baseline(&state.db, &params.astronaut_id).await?;
    store::baselines::upsert(&state.db, &baseline).await?;

    tracing::info!(
        astronaut_id = %params.astronaut_id,
        data_points = baseline.data_points,
        is_default = baseline.is_default,
        "Recalibrated baseline"
    );

    Ok(Json(RecalibrateResponse {
        success: true,
        baseline,
    }))
}
