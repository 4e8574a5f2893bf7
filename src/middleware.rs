//! Request-scoped middleware: request ID correlation and bearer-token
//! identity resolution.
//!
//! The request ID middleware generates a UUID v4 per request and wraps
//! processing in a tracing span so all logs within a request correlate.
//! The auth middleware resolves `Authorization: Bearer` into a
//! [`CurrentUser`] extension; endpoints that require identity call
//! [`CurrentUser::require`].

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use crate::store;

/// Extension type for accessing the request ID in handlers if needed.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

/// The authenticated account for this request, if a valid bearer token
/// was presented.
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    /// The account, or a 401 for endpoints that demand one.
    pub fn require(&self) -> Result<&User, AppError> {
        self.0
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
    }
}

/// Middleware that generates a request ID and creates a request span.
///
/// This should be the outermost layer so the span wraps all request
/// processing, including other middleware and handlers.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri.path();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    let mut request = request;
    request.extensions_mut().insert(RequestId(request_id));

    async move {
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await
}

/// Middleware that resolves the bearer token into a `CurrentUser`.
///
/// A missing header leaves the request anonymous; a header that is
/// present but invalid or expired is rejected outright with 401, whatever
/// the endpoint.
pub async fn auth_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned);

    let current_user = match bearer {
        None => CurrentUser(None),
        Some(token) => match resolve_user(&state, &token).await {
            Ok(user) => CurrentUser(Some(user)),
            Err(err) => return err.into_response(),
        },
    };

    request.extensions_mut().insert(current_user);
    next.run(request).await
}

async fn resolve_user(state: &AppState, token: &str) -> Result<User, AppError> {
    let user_id = state.signer.verify(token)?;
    store::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
}
