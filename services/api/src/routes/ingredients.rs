//! Ingredient endpoints (read-only)

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::ApiError, filters::IngredientQuery, state::AppState};

/// List ingredients, optionally filtered by a case-insensitive substring
/// match on the name
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredients = state
        .ingredient_repository
        .list(query.name.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list ingredients: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(ingredients))
}

/// Get an ingredient by ID
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient = state
        .ingredient_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get ingredient: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;

    Ok(Json(ingredient))
}
