//! User model and its output projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::recipe::RecipeSummaryView;

/// User entity
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for user registration
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
}

/// Request for changing the current user's password
#[derive(Debug, Clone, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

/// User projection returned by user endpoints and embedded in recipes
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Derived per request: whether the viewer follows this user.
    /// Always false for anonymous viewers and for the user themselves.
    pub is_subscribed: bool,
}

impl UserView {
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// User projection for subscription payloads: the followed author together
/// with their recipes
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRecipesView {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummaryView>,
    pub recipes_count: i64,
}

impl UserWithRecipesView {
    pub fn from_user(user: &User, recipes: Vec<RecipeSummaryView>, recipes_count: i64) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            // Only ever built for authors the viewer follows
            is_subscribed: true,
            recipes,
            recipes_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "chef.anna".to_string(),
            email: "anna@example.com".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Keller".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_view_omits_credentials() {
        let user = sample_user();
        let view = UserView::from_user(&user, false);
        let value = serde_json::to_value(&view).unwrap();

        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "chef.anna");
        assert_eq!(value["is_subscribed"], false);
    }

    #[test]
    fn test_user_with_recipes_view_is_subscribed() {
        let user = sample_user();
        let view = UserWithRecipesView::from_user(&user, vec![], 0);
        assert!(view.is_subscribed);
        assert_eq!(view.recipes_count, 0);
    }
}
