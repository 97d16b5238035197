//! Authentication middleware and extractors
//!
//! Callers authenticate with an opaque database-backed token presented as
//! `Authorization: Token <key>`. A global middleware resolves the token to
//! the acting user once per request; handlers then receive the identity
//! explicitly through the `AuthUser` / `Option<AuthUser>` extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::error;
use uuid::Uuid;

use crate::models::user::User;
use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

/// The token key the current request authenticated with
#[derive(Debug, Clone)]
pub struct AuthToken(pub String);

/// Resolve the Authorization header into an `AuthUser` request extension.
///
/// Anonymous requests pass through without an extension; endpoints that
/// require authentication reject via the `AuthUser` extractor. A supplied
/// token that is unknown or belongs to a deactivated account is rejected
/// with 401 outright, even on public endpoints.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Token "))
        .map(str::to_owned);

    if let Some(token) = token {
        let user = state
            .user_repository
            .find_by_token(&token)
            .await
            .map_err(|e| {
                error!("Failed to resolve auth token: {}", e);
                ApiError::Internal
            })?;

        req.extensions_mut().insert(identity_for(user)?);
        req.extensions_mut().insert(AuthToken(token));
    }

    Ok(next.run(req).await)
}

/// Turn a token lookup result into the acting identity. No match or a
/// deactivated account is a rejection, not an anonymous downgrade.
fn identity_for(user: Option<User>) -> Result<AuthUser, ApiError> {
    match user {
        Some(user) if user.is_active => Ok(AuthUser {
            id: user.id,
            username: user.username,
            is_staff: user.is_staff,
        }),
        _ => Err(ApiError::Unauthorized),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthToken>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user(is_active: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "chef.anna".to_string(),
            email: "anna@example.com".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Keller".to_string(),
            password_hash: "hash".to_string(),
            is_active,
            is_staff: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_identity_for_active_user() {
        let user = sample_user(true);
        let id = user.id;

        let identity = identity_for(Some(user)).unwrap();
        assert_eq!(identity.id, id);
        assert_eq!(identity.username, "chef.anna");
        assert!(identity.is_staff);
    }

    #[test]
    fn test_unknown_token_is_rejected_not_anonymous() {
        assert!(matches!(identity_for(None), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_deactivated_account_is_rejected() {
        let user = sample_user(false);
        assert!(matches!(
            identity_for(Some(user)),
            Err(ApiError::Unauthorized)
        ));
    }
}
