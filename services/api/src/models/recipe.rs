//! Recipe models: entity, write requests, and output projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::tag::Tag;
use crate::models::user::UserView;

/// Recipe entity
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    /// Media path of the uploaded image, relative to the media root
    pub image: String,
    pub pub_date: DateTime<Utc>,
}

/// One ingredient reference with its quantity in a write payload
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmount {
    pub id: Uuid,
    pub amount: i32,
}

/// Request body for recipe creation
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeWriteRequest {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<Uuid>,
    /// Base64-encoded image, either a data URI or a bare payload
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Request body for partial recipe updates. Supplying `ingredients` or
/// `tags` replaces the full existing set rather than merging with it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeUpdateRequest {
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<Uuid>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

/// Short recipe projection: returned by favorite/cart creation and embedded
/// in subscription payloads
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeSummaryView {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeSummaryView {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// One ingredient line inside a recipe detail payload
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeIngredientView {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe projection with embedded author, tags, ingredients, and the
/// per-viewer derived flags
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetailView {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    /// Derived per request; false for anonymous viewers
    pub is_favorited: bool,
    /// Derived per request; false for anonymous viewers
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_view_shape() {
        let recipe = Recipe {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            name: "Borscht".to_string(),
            text: "Beet soup".to_string(),
            cooking_time: 90,
            image: "recipes/abc.png".to_string(),
            pub_date: Utc::now(),
        };

        let value = serde_json::to_value(RecipeSummaryView::from_recipe(&recipe)).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        for key in ["id", "name", "image", "cooking_time"] {
            assert!(keys.contains(&key), "missing field {key}");
        }
    }
}
