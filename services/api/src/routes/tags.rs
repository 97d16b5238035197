//! Tag endpoints (read-only)

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// List all tags
pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.tag_repository.list().await.map_err(|e| {
        tracing::error!("Failed to list tags: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(tags))
}

/// Get a tag by ID
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state
        .tag_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get tag: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag))
}
