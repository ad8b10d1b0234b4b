//! Axum route handlers for the session API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::User;
use crate::session::client::{auth_for, ClientId};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<User>, AppError> {
    let user = auth_for(&state, client)
        .signup(&request.email, &request.password)
        .await?;
    info!("Registered user {} for client {}", user.email, client.0);
    Ok(Json(user))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<User>, AppError> {
    let user = auth_for(&state, client)
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(user))
}

/// POST /api/v1/auth/guest
pub async fn handle_guest_login(
    State(state): State<AppState>,
    client: ClientId,
) -> Result<Json<User>, AppError> {
    let user = auth_for(&state, client).login_as_guest().await?;
    Ok(Json(user))
}

/// POST /api/v1/auth/logout
///
/// Also drops the client's stored generation result.
pub async fn handle_logout(
    State(state): State<AppState>,
    client: ClientId,
) -> Result<StatusCode, AppError> {
    auth_for(&state, client).logout().await?;
    state.submissions.forget(client.0);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
pub async fn handle_session(
    State(state): State<AppState>,
    client: ClientId,
) -> Result<Json<User>, AppError> {
    auth_for(&state, client)
        .current_user()
        .await?
        .map(Json)
        .ok_or(AppError::Unauthorized)
}
