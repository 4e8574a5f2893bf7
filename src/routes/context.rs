//! Handlers for mission context updates and queries.
//!
//! Context rows are upserted last-write-wins; a missing row falls back to
//! the transit defaults rather than erroring, so risk scoring always has
//! a phase to consult.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::MissionContext;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub astronaut_id: String,
    pub mission_phase: String,
    pub time_of_day: String,
    pub work_cycle: String,
    pub days_since_launch: i64,
    pub current_workload: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub context: MissionContext,
}

/// The context assumed for an astronaut who has never reported one:
/// first day in transit, morning, active cycle, moderate workload.
pub(crate) fn initial_context(astronaut_id: &str) -> MissionContext {
    MissionContext {
        id: Uuid::new_v4(),
        astronaut_id: astronaut_id.to_string(),
        mission_phase: "transit".to_string(),
        time_of_day: "morning".to_string(),
        work_cycle: "active".to_string(),
        days_since_launch: 1,
        current_workload: "moderate".to_string(),
        updated_at: Utc::now(),
    }
}

/// Handler for POST /api/context/update.
#[instrument(name = "context::update", skip(state, request), fields(astronaut_id = %request.astronaut_id, phase = %request.mission_phase))]
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, AppError> {
    let context = MissionContext {
        id: Uuid::new_v4(),
        astronaut_id: request.astronaut_id,
        mission_phase: request.mission_phase,
        time_of_day: request.time_of_day,
        work_cycle: request.work_cycle,
        days_since_launch: request.days_since_launch,
        current_workload: request.current_workload,
        updated_at: Utc::now(),
    };

    store::context::upsert(&state.db, &context).await?;

    Ok(Json(UpdateResponse {
        success: true,
        context,
    }))
}

/// Handler for GET /api/context/{astronaut_id}. Falls back to the
/// transit defaults without persisting them.
#[instrument(name = "context::get", skip(state))]
pub async fn get_context(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
) -> Result<Json<MissionContext>, AppError> {
    let context = store::context::find(&state.db, &astronaut_id)
        .await?
        .unwrap_or_else(|| initial_context(&astronaut_id));
    Ok(Json(context))
}
