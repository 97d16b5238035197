//! Ingredient repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::filters::escape_like;
use crate::models::ingredient::Ingredient;

/// Ingredient repository
#[derive(Clone)]
pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    /// Create a new ingredient repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List ingredients, optionally narrowed by a case-insensitive
    /// substring match on the name. The listing is not paginated.
    pub async fn list(&self, name: Option<&str>) -> Result<Vec<Ingredient>> {
        let ingredients = match name {
            Some(name) if !name.is_empty() => {
                sqlx::query_as::<_, Ingredient>(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE name ILIKE $1
                    ORDER BY name
                    "#,
                )
                .bind(format!("%{}%", escape_like(name)))
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(ingredients)
    }

    /// Find an ingredient by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Ingredient>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ingredient)
    }

    /// Of the given ids, the subset that exists
    pub async fn existing_ids(&self, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let found: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;

        Ok(found.into_iter().collect())
    }
}
