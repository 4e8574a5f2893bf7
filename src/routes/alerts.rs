//! Handlers for alert listing and acknowledgment.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::config::ALERT_LIST_LIMIT;
use crate::error::AppError;
use crate::models::{Alert, AlertStatus};
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Status filter; "all" disables filtering. Defaults to "active".
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
pub struct AcknowledgeRequest {
    pub alert_id: Uuid,
    pub astronaut_id: String,
    pub action: AlertStatus,
}

#[derive(Debug, Serialize)]
pub struct AcknowledgeResponse {
    pub success: bool,
}

/// Handler for GET /api/alerts/{astronaut_id}.
#[instrument(name = "alerts::list", skip(state, params))]
pub async fn list(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, AppError> {
    let filter = match params.status.as_deref().unwrap_or("active") {
        "all" => None,
        raw => Some(AlertStatus::from_str(raw).map_err(AppError::BadRequest)?),
    };

    let alerts = store::alerts::list(&state.db, &astronaut_id, filter, ALERT_LIST_LIMIT).await?;
    Ok(Json(ListResponse { alerts }))
}

/// Handler for POST /api/alerts/acknowledge.
///
/// Moves the alert to the requested state. An unknown alert id is not an
/// error; the response just reports that nothing changed.
#[instrument(name = "alerts::acknowledge", skip(state, request), fields(alert_id = %request.alert_id, action = ?request.action))]
pub async fn acknowledge(
    State(state): State<AppState>,
    Json(request): Json<AcknowledgeRequest>,
) -> Result<Json<AcknowledgeResponse>, AppError> {
    let success = store::alerts::acknowledge(
        &state.db,
        request.alert_id,
        request.action,
        &request.astronaut_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(AcknowledgeResponse { success }))
}
