//! Axum route handlers for the Portfolio API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::portfolio::DatedPost;
use crate::portfolio::posts::parse_posts;
use crate::portfolio::submission::{
    submit_generation, GenerateRequest, GenerateResponse, LatestResult,
};
use crate::portfolio::upload::decode_text_upload;
use crate::session::client::{require_user, ClientId};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParsePostsRequest {
    pub posts_text: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: Option<String>,
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct LatestResponse {
    pub in_flight: bool,
    #[serde(flatten)]
    pub latest: LatestResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/portfolio/generate
///
/// Runs the timeline and simple-portfolio generations concurrently. Either
/// half may be missing; `messages` names each one that is.
pub async fn handle_generate(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    require_user(&state, client).await?;

    let response =
        submit_generation(state.generator.clone(), &state.submissions, client.0, request).await?;
    Ok(Json(response))
}

/// GET /api/v1/portfolio/latest
///
/// Returns the client's most recent accepted result.
pub async fn handle_latest(
    State(state): State<AppState>,
    client: ClientId,
) -> Result<Json<LatestResponse>, AppError> {
    require_user(&state, client).await?;

    let latest = state
        .submissions
        .latest(client.0)
        .ok_or_else(|| AppError::NotFound("No portfolio has been generated yet".to_string()))?;

    Ok(Json(LatestResponse {
        in_flight: state.submissions.in_flight(client.0),
        latest,
    }))
}

/// POST /api/v1/posts/parse
///
/// Previews how pasted posts will be dated before generating.
pub async fn handle_parse_posts(
    State(state): State<AppState>,
    client: ClientId,
    Json(request): Json<ParsePostsRequest>,
) -> Result<Json<Vec<DatedPost>>, AppError> {
    require_user(&state, client).await?;
    Ok(Json(parse_posts(&request.posts_text)))
}

/// POST /api/v1/resume/upload
///
/// Accepts a single plain-text résumé file and returns its content.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    client: ClientId,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    require_user(&state, client).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::Validation("No file was uploaded".to_string()))?;

    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

    let resume_text = decode_text_upload(file_name.as_deref(), content_type.as_deref(), data)?;
    info!(
        "Accepted résumé upload ({} bytes) for client {}",
        resume_text.len(),
        client.0
    );

    Ok(Json(UploadResponse {
        file_name,
        resume_text,
    }))
}
