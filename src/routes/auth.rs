//! Authentication routes.
//!
//! Routes:
//! - POST /api/auth/register - Create an account and seed mission context
//! - POST /api/auth/login - Exchange credentials for a bearer token
//! - GET /api/auth/me - The authenticated account
//! - PUT /api/auth/profile - Update presentation fields

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::{generate_astronaut_id, hash_password, verify_password};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Role, User};
use crate::routes::context::initial_context;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    pub astronaut_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Create an account. Duplicate email is a client error; a fresh account
/// also gets an initial mission context so risk scoring has a phase to
/// consult from the first reading.
#[instrument(name = "auth::register", skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if store::users::find_by_email(&state.db, &request.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let astronaut_id = request
        .astronaut_id
        .unwrap_or_else(generate_astronaut_id);

    let user = User {
        id: Uuid::new_v4(),
        email: request.email,
        password_hash: hash_password(&request.password)?,
        full_name: request.full_name,
        role: request.role,
        astronaut_id: astronaut_id.clone(),
        avatar_url: None,
        created_at: Utc::now(),
        last_login: None,
    };

    store::users::insert(&state.db, &user).await?;
    store::context::upsert(&state.db, &initial_context(&astronaut_id)).await?;

    tracing::info!(user_id = %user.id, astronaut_id = %astronaut_id, "Registered account");

    let access_token = state.signer.mint(user.id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}

/// Exchange credentials for a bearer token. The same message covers an
/// unknown email and a wrong password.
#[instrument(name = "auth::login", skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let mut user = store::users::find_by_email(&state.db, &request.email)
        .await?
        .filter(|user| verify_password(&request.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let now = Utc::now();
    store::users::touch_last_login(&state.db, user.id, now).await?;
    user.last_login = Some(now);

    let access_token = state.signer.mint(user.id)?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}

/// The authenticated account.
#[instrument(name = "auth::me", skip_all)]
pub async fn me(Extension(current_user): Extension<CurrentUser>) -> Result<Json<User>, AppError> {
    Ok(Json(current_user.require()?.clone()))
}

/// Update the mutable presentation fields and return the fresh account.
#[instrument(name = "auth::profile", skip(state, current_user, update))]
pub async fn profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    let user = current_user.require()?;

    store::users::update_profile(
        &state.db,
        user.id,
        update.full_name.as_deref(),
        update.avatar_url.as_deref(),
    )
    .await?;

    let refreshed = store::users::find_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(Json(refreshed))
}
