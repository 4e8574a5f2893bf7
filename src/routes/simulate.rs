//! Handler for demo data generation.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::routes::health_data::process_reading;
use crate::sim;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    pub astronaut_id: String,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub records_created: usize,
}

/// Handler for POST /api/simulate/generate.
///
/// Synthesized readings run through the full ingestion path so the demo
/// data carries validation results, baselines, and alerts like real
/// telemetry would.
#[instrument(name = "simulate::generate", skip(state, params), fields(astronaut_id = %params.astronaut_id))]
pub async fn generate(
    State(state): State<AppState>,
    Query(params): Query<GenerateParams>,
) -> Result<Json<GenerateResponse>, AppError> {
    let days = params.days.unwrap_or(7);

    // Generate up front so the RNG is not held across await points.
    let inputs = {
        let mut rng = rand::thread_rng();
        sim::generate_inputs(&mut rng, &params.astronaut_id, days)
    };

    let mut records_created = 0;
    for input in inputs {
        process_reading(&state, input).await?;
        records_created += 1;
    }

    tracing::info!(records_created, days, "Generated simulation data");

    Ok(Json(GenerateResponse {
        success: true,
        records_created,
    }))
}
