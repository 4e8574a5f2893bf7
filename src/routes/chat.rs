//! Handlers for the psychological support chat.
//!
//! The send path assembles the persona prompt with the astronaut's latest
//! vitals and the trailing session window, forwards the message to the
//! completion provider, and persists the exchange.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::config::{CHAT_HISTORY_LIMIT, CHAT_WINDOW_FETCH, CHAT_WINDOW_INLINE};
use crate::error::AppError;
use crate::models::ChatRecord;
use crate::state::AppState;
use crate::store;
use crate::support::{build_system_prompt, default_session_id};

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub astronaut_id: String,
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub response: String,
    pub session_id: String,
    pub message_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub session_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ChatRecord>,
}

/// Handler for POST /api/chat/send.
#[instrument(name = "chat::send", skip(state, request), fields(astronaut_id = %request.astronaut_id))]
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendResponse>, AppError> {
    let now = Utc::now();
    let session_id = request
        .session_id
        .unwrap_or_else(|| default_session_id(&request.astronaut_id, now));

    let window = store::chat::session_window(&state.db, &session_id, CHAT_WINDOW_FETCH).await?;
    let latest_reading = store::readings::latest(&state.db, &request.astronaut_id).await?;

    let system_prompt =
        build_system_prompt(latest_reading.as_ref(), &window, CHAT_WINDOW_INLINE);

    let response = state
        .support
        .complete(&system_prompt, &request.message)
        .await?;

    let record = ChatRecord {
        id: Uuid::new_v4(),
        astronaut_id: request.astronaut_id,
        session_id: session_id.clone(),
        user_message: request.message,
        assistant_response: response.clone(),
        timestamp: now,
    };
    store::chat::insert(&state.db, &record).await?;

    tracing::debug!(session_id = %session_id, message_id = %record.id, "Stored chat exchange");

    Ok(Json(SendResponse {
        response,
        session_id,
        message_id: record.id,
    }))
}

/// Handler for GET /api/chat/history/{astronaut_id}. Returns exchanges
/// oldest first, most recent page.
#[instrument(name = "chat::history", skip(state, params))]
pub async fn history(
    State(state): State<AppState>,
    Path(astronaut_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, AppError> {
    let limit = params.limit.unwrap_or(CHAT_HISTORY_LIMIT).clamp(1, CHAT_HISTORY_LIMIT);

    let mut history = store::chat::history(
        &state.db,
        &astronaut_id,
        params.session_id.as_deref(),
        limit,
    )
    .await?;
    history.reverse();

    Ok(Json(HistoryResponse { history }))
}
