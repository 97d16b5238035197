//! Token authentication endpoints

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::ApiError,
    middleware::{AuthToken, AuthUser},
    state::AppState,
};

/// Request for token login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for token login
#[derive(Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Exchange credentials for an auth token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Login attempt for {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user: {}", e);
            ApiError::Internal
        })?;

    // One rejection for unknown email, wrong password, and inactive account
    let rejection =
        || ApiError::Validation("Unable to log in with the provided credentials".to_string());

    let user = user.ok_or_else(rejection)?;
    if !user.is_active {
        return Err(rejection());
    }

    let valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .map_err(|e| {
            tracing::error!("Failed to verify password: {}", e);
            ApiError::Internal
        })?;
    if !valid {
        return Err(rejection());
    }

    let auth_token = state
        .user_repository
        .create_token(user.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to issue token: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(TokenResponse { auth_token }))
}

/// Invalidate the token the request authenticated with
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    AuthToken(token): AuthToken,
) -> Result<impl IntoResponse, ApiError> {
    info!("Logout for user {}", user.username);

    state
        .user_repository
        .delete_token(&token)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete token: {}", e);
            ApiError::Internal
        })?;

    Ok(StatusCode::NO_CONTENT)
}
