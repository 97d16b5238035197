//! Recipe endpoints: CRUD, favorites, shopping cart, and the shopping-list
//! export

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::Query;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    filters::{RecipeFilter, RecipeQuery},
    middleware::AuthUser,
    models::recipe::{
        Recipe, RecipeDetailView, RecipeSummaryView, RecipeUpdateRequest, RecipeWriteRequest,
    },
    models::user::UserView,
    models::{Paginated, clamp_page},
    repositories::relation::{RecipeLink, RelationError},
    shopping_list,
    state::AppState,
    validation,
};

/// List recipes, newest first, narrowed by the query filters
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Query(query): Query<RecipeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = clamp_page(query.page, query.limit);
    let viewer_id = viewer.map(|v| v.id);
    let filter = RecipeFilter::from_query(&query, viewer_id);

    let (recipes, total) = state
        .recipe_repository
        .list(&filter, page, limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list recipes: {}", e);
            ApiError::Internal
        })?;

    let mut items = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        items.push(detail_view(&state, recipe, viewer_id).await?);
    }

    Ok(Json(Paginated {
        items,
        page,
        limit,
        total,
    }))
}

/// Create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecipeWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_cooking_time(payload.cooking_time).map_err(ApiError::Validation)?;
    validation::validate_recipe_tags(&payload.tags).map_err(ApiError::Validation)?;
    validation::validate_recipe_ingredients(&payload.ingredients)
        .map_err(ApiError::Validation)?;

    check_tag_ids(&state, &payload.tags).await?;
    let ingredient_ids: Vec<Uuid> = payload.ingredients.iter().map(|i| i.id).collect();
    check_ingredient_ids(&state, &ingredient_ids).await?;

    let image_path = state.storage.save_recipe_image(&payload.image).await?;

    let recipe = state
        .recipe_repository
        .create(user.id, &payload, &image_path)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create recipe: {}", e);
            ApiError::Internal
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeSummaryView::from_recipe(&recipe)),
    ))
}

/// Get a recipe by ID
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = find_recipe(&state, id).await?;
    let view = detail_view(&state, recipe, viewer.map(|v| v.id)).await?;
    Ok(Json(view))
}

/// Update a recipe. Requires authorship or staff role. Supplied tag and
/// ingredient lists replace the existing sets.
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = find_recipe(&state, id).await?;
    authorize_author(&user, &recipe)?;

    if let Some(cooking_time) = payload.cooking_time {
        validation::validate_cooking_time(cooking_time).map_err(ApiError::Validation)?;
    }
    if let Some(tags) = &payload.tags {
        validation::validate_recipe_tags(tags).map_err(ApiError::Validation)?;
        check_tag_ids(&state, tags).await?;
    }
    if let Some(ingredients) = &payload.ingredients {
        validation::validate_recipe_ingredients(ingredients).map_err(ApiError::Validation)?;
        let ids: Vec<Uuid> = ingredients.iter().map(|i| i.id).collect();
        check_ingredient_ids(&state, &ids).await?;
    }

    let image_path = match &payload.image {
        Some(image) => Some(state.storage.save_recipe_image(image).await?),
        None => None,
    };

    let updated = state
        .recipe_repository
        .update(recipe.id, &payload, image_path.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to update recipe: {}", e);
            ApiError::Internal
        })?;

    let view = detail_view(&state, updated, Some(user.id)).await?;
    Ok(Json(view))
}

/// Delete a recipe. Requires authorship or staff role.
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = find_recipe(&state, id).await?;
    authorize_author(&user, &recipe)?;

    state.recipe_repository.delete(recipe.id).await.map_err(|e| {
        tracing::error!("Failed to delete recipe: {}", e);
        ApiError::Internal
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the current user's favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    add_recipe_link(&state, RecipeLink::Favorite, &user, id).await
}

/// Remove a recipe from the current user's favorites
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    remove_recipe_link(&state, RecipeLink::Favorite, &user, id).await
}

/// Add a recipe to the current user's shopping cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    add_recipe_link(&state, RecipeLink::Cart, &user, id).await
}

/// Remove a recipe from the current user's shopping cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    remove_recipe_link(&state, RecipeLink::Cart, &user, id).await
}

/// Export the current user's aggregated shopping list as a text attachment.
/// An empty cart yields an empty file, not an error.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .relation_repository
        .shopping_list(user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate shopping list: {}", e);
            ApiError::Internal
        })?;

    let body = shopping_list::render(&entries);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    shopping_list::ATTACHMENT_FILENAME
                ),
            ),
        ],
        body,
    ))
}

/// Shared add path for favorites and cart: 404 for an unknown recipe,
/// 400 when the relation already exists, 201 with the short view otherwise
async fn add_recipe_link(
    state: &AppState,
    link: RecipeLink,
    user: &AuthUser,
    recipe_id: Uuid,
) -> ApiResult<(StatusCode, Json<RecipeSummaryView>)> {
    let recipe = find_recipe(state, recipe_id).await?;

    state
        .relation_repository
        .add_recipe_link(link, user.id, recipe.id)
        .await
        .map_err(|e| match e {
            RelationError::AlreadyExists => ApiError::Conflict(format!(
                "Recipe is already in your {}",
                link.description()
            )),
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeSummaryView::from_recipe(&recipe)),
    ))
}

/// Shared remove path for favorites and cart
async fn remove_recipe_link(
    state: &AppState,
    link: RecipeLink,
    user: &AuthUser,
    recipe_id: Uuid,
) -> ApiResult<StatusCode> {
    let recipe = find_recipe(state, recipe_id).await?;

    state
        .relation_repository
        .remove_recipe_link(link, user.id, recipe.id)
        .await
        .map_err(|e| match e {
            RelationError::Missing => ApiError::NotLinked(format!(
                "Recipe is not in your {}",
                link.description()
            )),
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a recipe or fail with 404
async fn find_recipe(state: &AppState, id: Uuid) -> ApiResult<Recipe> {
    state
        .recipe_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get recipe: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))
}

/// Only the author or a staff member may mutate a recipe
fn authorize_author(user: &AuthUser, recipe: &Recipe) -> ApiResult<()> {
    if user.id != recipe.author_id && !user.is_staff {
        return Err(ApiError::PermissionDenied);
    }
    Ok(())
}

/// Assemble the full recipe projection for a viewer
async fn detail_view(
    state: &AppState,
    recipe: Recipe,
    viewer: Option<Uuid>,
) -> ApiResult<RecipeDetailView> {
    let author = state
        .user_repository
        .find_by_id(recipe.author_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get recipe author: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Recipe author not found".to_string()))?;

    let author_subscribed = match viewer {
        Some(viewer_id) if viewer_id != author.id => state
            .user_repository
            .is_following(viewer_id, author.id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to resolve subscription: {}", e);
                ApiError::Internal
            })?,
        _ => false,
    };

    let tags = state.recipe_repository.tags_for(recipe.id).await.map_err(|e| {
        tracing::error!("Failed to get recipe tags: {}", e);
        ApiError::Internal
    })?;

    let ingredients = state
        .recipe_repository
        .ingredients_for(recipe.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get recipe ingredients: {}", e);
            ApiError::Internal
        })?;

    let (is_favorited, is_in_shopping_cart) = state
        .recipe_repository
        .viewer_flags(recipe.id, viewer)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve viewer flags: {}", e);
            ApiError::Internal
        })?;

    Ok(RecipeDetailView {
        id: recipe.id,
        tags,
        author: UserView::from_user(&author, author_subscribed),
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Validate that every referenced tag id exists
async fn check_tag_ids(state: &AppState, tags: &[Uuid]) -> ApiResult<()> {
    let existing = state.tag_repository.existing_ids(tags).await.map_err(|e| {
        tracing::error!("Failed to check tag ids: {}", e);
        ApiError::Internal
    })?;

    for tag in tags {
        if !existing.contains(tag) {
            return Err(ApiError::Validation(format!("Unknown tag id: {}", tag)));
        }
    }
    Ok(())
}

/// Validate that every referenced ingredient id exists
async fn check_ingredient_ids(state: &AppState, ids: &[Uuid]) -> ApiResult<()> {
    let existing = state
        .ingredient_repository
        .existing_ids(ids)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check ingredient ids: {}", e);
            ApiError::Internal
        })?;

    for id in ids {
        if !existing.contains(id) {
            return Err(ApiError::Validation(format!("Unknown ingredient id: {}", id)));
        }
    }
    Ok(())
}
