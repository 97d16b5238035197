//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::relation::RelationError;
use crate::storage::StorageError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Relation already exists
    #[error("{0}")]
    Conflict(String),

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Deleting a relation that does not exist; a client error, not a fault
    #[error("{0}")]
    NotLinked(String),

    /// Authentication required
    #[error("Authentication credentials were not provided")]
    Unauthorized,

    /// Caller lacks authorship or staff role for the attempted mutation
    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    /// User attempted to follow themselves
    #[error("You cannot subscribe to yourself")]
    SelfFollow,

    /// Database error
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// Internal server error
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_)
            | ApiError::Conflict(_)
            | ApiError::NotLinked(_)
            | ApiError::SelfFollow => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidPayload(msg) => {
                ApiError::Validation(format!("Invalid image payload: {}", msg))
            }
            StorageError::Io(e) => {
                tracing::error!("Failed to store image: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<RelationError> for ApiError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::AlreadyExists => ApiError::Conflict("Relation already exists".into()),
            RelationError::Missing => ApiError::NotLinked("Relation does not exist".into()),
            RelationError::SelfFollow => ApiError::SelfFollow,
            RelationError::Database(e) => ApiError::Database(e),
        }
    }
}

/// Whether an error is a Postgres unique-constraint violation.
///
/// Uniqueness is enforced both by a pre-check (clean message) and by the
/// store constraint; the losing side of a concurrent duplicate write hits
/// the constraint and must still surface as a client error.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().and_then(|db| db.code()),
        Some(code) if code == "23505"
    )
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_client_errors_map_to_bad_request() {
        assert_eq!(status_of(ApiError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::Conflict("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::NotLinked("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ApiError::SelfFollow), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_remaining_variants_map_to_their_status() {
        assert_eq!(status_of(ApiError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ApiError::PermissionDenied), StatusCode::FORBIDDEN);
        assert_eq!(status_of(ApiError::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            status_of(ApiError::Database(sqlx::Error::RowNotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_relation_errors_convert_to_client_errors() {
        use crate::repositories::relation::RelationError;

        let already: ApiError = RelationError::AlreadyExists.into();
        assert!(matches!(&already, ApiError::Conflict(_)));
        assert_eq!(status_of(already), StatusCode::BAD_REQUEST);

        let missing: ApiError = RelationError::Missing.into();
        assert!(matches!(&missing, ApiError::NotLinked(_)));
        assert_eq!(status_of(missing), StatusCode::BAD_REQUEST);

        let self_follow: ApiError = RelationError::SelfFollow.into();
        assert!(matches!(&self_follow, ApiError::SelfFollow));
        assert_eq!(status_of(self_follow), StatusCode::BAD_REQUEST);

        let database: ApiError = RelationError::Database(sqlx::Error::PoolClosed).into();
        assert_eq!(status_of(database), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_error_messages_hide_details() {
        // The response body carries Display output; server faults must not
        // surface the underlying error
        assert_eq!(ApiError::Internal.to_string(), "Internal server error");
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).to_string(),
            "Database error"
        );
    }
}
