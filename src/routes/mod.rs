//! HTTP route handlers for the telemetry API.
//!
//! Routes are organized by resource, with per-group Cache-Control
//! headers: read-only telemetry tolerates a few seconds of staleness,
//! while anything touching credentials, conversation state, or writes is
//! marked no-store.
//!
//! Request tracing is enabled via middleware that generates a unique
//! request ID for each incoming request, allowing correlation of all
//! logs within a request.

pub mod alerts;
pub mod auth;
pub mod baseline;
pub mod chat;
pub mod context;
pub mod facial;
pub mod health_data;
pub mod simulate;
pub mod system;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{CACHE_CONTROL_NONE, CACHE_CONTROL_READ};
use crate::middleware::{auth_layer, request_id_layer};
use crate::state::AppState;

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Credentials and profile - never cached
    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/profile", put(auth::profile))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NONE),
        ));

    // Telemetry reads - short private cache
    let read_routes = Router::new()
        .route("/api/health/latest/{astronaut_id}", get(health_data::latest))
        .route(
            "/api/health/timeline/{astronaut_id}",
            get(health_data::timeline),
        )
        .route("/api/facial/history/{astronaut_id}", get(facial::history))
        .route("/api/facial/latest/{astronaut_id}", get(facial::latest))
        .route("/api/baseline/{astronaut_id}", get(baseline::get_baseline))
        .route("/api/context/{astronaut_id}", get(context::get_context))
        .route("/api/alerts/{astronaut_id}", get(alerts::list))
        .route("/api/astronauts", get(system::astronauts))
        .route(
            "/api/dashboard/summary/{astronaut_id}",
            get(system::dashboard_summary),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_READ),
        ));

    // Writes and the chat proxy - never cached
    let write_routes = Router::new()
        .route("/api/health/ingest", post(health_data::ingest))
        .route("/api/facial/analyze", post(facial::analyze))
        .route("/api/baseline/recalibrate", post(baseline::recalibrate))
        .route("/api/context/update", post(context::update))
        .route("/api/alerts/acknowledge", post(alerts::acknowledge))
        .route("/api/chat/send", post(chat::send))
        .route("/api/chat/history/{astronaut_id}", get(chat::history))
        .route("/api/simulate/generate", post(simulate::generate))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NONE),
        ));

    // Liveness probe - no cache header, always fresh
    let system_routes = Router::new().route("/api/health", get(system::health));

    Router::new()
        .merge(auth_routes)
        .merge(read_routes)
        .merge(write_routes)
        .merge(system_routes)
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        // Auth layer - resolves the bearer token into CurrentUser
        .layer(middleware::from_fn_with_state(state, auth_layer))
        // Request ID middleware - creates root span for correlation
        .layer(middleware::from_fn(request_id_layer))
}
