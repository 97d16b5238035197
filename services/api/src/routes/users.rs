//! User endpoints: registration, profiles, password change, subscriptions

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult, is_unique_violation},
    filters::PageQuery,
    middleware::AuthUser,
    models::user::{CreateUserRequest, SetPasswordRequest, User, UserView, UserWithRecipesView},
    models::{Paginated, clamp_page},
    state::AppState,
    validation,
};

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_username(&payload.username).map_err(ApiError::Validation)?;
    validation::validate_email(&payload.email).map_err(ApiError::Validation)?;
    validation::validate_password(&payload.password).map_err(ApiError::Validation)?;

    // Pre-check for a clean message; the unique constraints below remain
    // the arbiter for concurrent registrations
    let taken = state
        .user_repository
        .username_or_email_taken(&payload.username, &payload.email)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check username availability: {}", e);
            ApiError::Internal
        })?;
    if taken {
        return Err(ApiError::Validation(
            "A user with this username or email already exists".to_string(),
        ));
    }

    let user = state.user_repository.create(&payload).await.map_err(|e| {
        if matches!(e.downcast_ref::<sqlx::Error>(), Some(err) if is_unique_violation(err)) {
            return ApiError::Validation(
                "A user with this username or email already exists".to_string(),
            );
        }
        tracing::error!("Failed to create user: {}", e);
        ApiError::Internal
    })?;

    Ok((StatusCode::CREATED, Json(UserView::from_user(&user, false))))
}

/// List users with pagination
pub async fn list_users(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = clamp_page(query.page, query.limit);

    let (users, total) = state.user_repository.list(page, limit).await.map_err(|e| {
        tracing::error!("Failed to list users: {}", e);
        ApiError::Internal
    })?;

    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let followed = state
        .user_repository
        .following_ids(viewer.map(|v| v.id), &ids)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve subscriptions: {}", e);
            ApiError::Internal
        })?;

    let items = users
        .iter()
        .map(|u| UserView::from_user(u, followed.contains(&u.id)))
        .collect();

    Ok(Json(Paginated {
        items,
        page,
        limit,
        total,
    }))
}

/// Get the current user's profile
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = find_user(&state, user.id).await?;
    // A user never counts as subscribed to themselves
    Ok(Json(UserView::from_user(&user, false)))
}

/// Get a user's profile by ID
pub async fn get_user(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = find_user(&state, id).await?;

    let is_subscribed = match viewer {
        Some(viewer) if viewer.id != user.id => state
            .user_repository
            .is_following(viewer.id, user.id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to resolve subscription: {}", e);
                ApiError::Internal
            })?,
        _ => false,
    };

    Ok(Json(UserView::from_user(&user, is_subscribed)))
}

/// Change the current user's password
pub async fn set_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_password(&payload.new_password).map_err(ApiError::Validation)?;

    let current = find_user(&state, user.id).await?;

    let valid = state
        .user_repository
        .verify_password(&current, &payload.current_password)
        .map_err(|e| {
            tracing::error!("Failed to verify password: {}", e);
            ApiError::Internal
        })?;
    if !valid {
        return Err(ApiError::Validation("Current password is incorrect".to_string()));
    }

    state
        .user_repository
        .update_password(user.id, &payload.new_password)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update password: {}", e);
            ApiError::Internal
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the authors the current user follows, with their recipes
pub async fn subscriptions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = clamp_page(query.page, query.limit);

    let (authors, total) = state
        .user_repository
        .subscriptions(user.id, page, limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list subscriptions: {}", e);
            ApiError::Internal
        })?;

    let mut items = Vec::with_capacity(authors.len());
    for author in &authors {
        items.push(author_with_recipes(&state, author).await?);
    }

    Ok(Json(Paginated {
        items,
        page,
        limit,
        total,
    }))
}

/// Subscribe to an author
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let author = find_user(&state, id).await?;

    state
        .relation_repository
        .add_follow(user.id, author.id)
        .await
        .map_err(|e| match e {
            crate::repositories::relation::RelationError::AlreadyExists => {
                ApiError::Conflict("You are already subscribed to this author".to_string())
            }
            other => other.into(),
        })?;

    let view = author_with_recipes(&state, &author).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Unsubscribe from an author
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let author = find_user(&state, id).await?;

    state
        .relation_repository
        .remove_follow(user.id, author.id)
        .await
        .map_err(|e| match e {
            crate::repositories::relation::RelationError::Missing => {
                ApiError::NotLinked("You are not subscribed to this author".to_string())
            }
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a user or fail with 404
async fn find_user(state: &AppState, id: Uuid) -> ApiResult<User> {
    state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Assemble the subscription projection for a followed author
async fn author_with_recipes(
    state: &AppState,
    author: &User,
) -> ApiResult<UserWithRecipesView> {
    let recipes = state
        .recipe_repository
        .summaries_by_author(author.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list author recipes: {}", e);
            ApiError::Internal
        })?;

    let recipes_count = state
        .recipe_repository
        .count_by_author(author.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count author recipes: {}", e);
            ApiError::Internal
        })?;

    Ok(UserWithRecipesView::from_user(author, recipes, recipes_count))
}
