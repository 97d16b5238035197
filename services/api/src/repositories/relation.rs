//! Relation guard: uniform add/remove semantics for the join entities
//! (favorites, shopping cart, follows)
//!
//! Every relation holds at most one row per pair. Adds run a pre-check for
//! a clean conflict message, then insert with `ON CONFLICT DO NOTHING`; the
//! store constraint remains the authoritative arbiter, so the losing side
//! of a concurrent duplicate add also observes `AlreadyExists` rather than
//! a server fault. Removes delete at most one row and report `Missing`
//! when there was nothing to delete.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::shopping_list::ShoppingListEntry;

/// The two user-to-recipe join relations sharing add/remove semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeLink {
    Favorite,
    Cart,
}

impl RecipeLink {
    fn table(self) -> &'static str {
        match self {
            RecipeLink::Favorite => "favorites",
            RecipeLink::Cart => "cart_items",
        }
    }

    /// Human-readable name used in client-facing error messages
    pub fn description(self) -> &'static str {
        match self {
            RecipeLink::Favorite => "favorites",
            RecipeLink::Cart => "shopping cart",
        }
    }
}

/// Errors from relation guard operations
#[derive(Error, Debug)]
pub enum RelationError {
    /// The pair is already linked
    #[error("relation already exists")]
    AlreadyExists,

    /// No row exists for the pair
    #[error("relation does not exist")]
    Missing,

    /// A user attempted to follow themselves
    #[error("cannot follow yourself")]
    SelfFollow,

    /// Underlying database failure
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Repository enforcing the join-entity uniqueness invariants
#[derive(Clone)]
pub struct RelationRepository {
    pool: PgPool,
}

impl RelationRepository {
    /// Create a new relation repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Link a recipe to a user's favorites or cart; at most one row per
    /// (user, recipe) pair
    pub async fn add_recipe_link(
        &self,
        link: RecipeLink,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<(), RelationError> {
        let exists: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND recipe_id = $2)",
            link.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(RelationError::AlreadyExists);
        }

        let result = sqlx::query(&format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            link.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        // Zero rows after a passing pre-check means a concurrent writer won
        if result.rows_affected() == 0 {
            return Err(RelationError::AlreadyExists);
        }

        Ok(())
    }

    /// Unlink a recipe from a user's favorites or cart
    pub async fn remove_recipe_link(
        &self,
        link: RecipeLink,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<(), RelationError> {
        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            link.table()
        ))
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RelationError::Missing);
        }

        Ok(())
    }

    /// Subscribe `follower` to `following`. Self-follows are rejected
    /// before any query, independent of existing relation state.
    pub async fn add_follow(
        &self,
        follower: Uuid,
        following: Uuid,
    ) -> Result<(), RelationError> {
        if follower == following {
            return Err(RelationError::SelfFollow);
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND following_id = $2)",
        )
        .bind(follower)
        .bind(following)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(RelationError::AlreadyExists);
        }

        let result = sqlx::query(
            "INSERT INTO follows (user_id, following_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower)
        .bind(following)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RelationError::AlreadyExists);
        }

        Ok(())
    }

    /// Unsubscribe `follower` from `following`
    pub async fn remove_follow(
        &self,
        follower: Uuid,
        following: Uuid,
    ) -> Result<(), RelationError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE user_id = $1 AND following_id = $2")
                .bind(follower)
                .bind(following)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RelationError::Missing);
        }

        Ok(())
    }

    /// Aggregate the user's shopping list: quantities of every ingredient
    /// across all cart recipes, grouped by (name, unit) and summed, in a
    /// deterministic order
    pub async fn shopping_list(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ShoppingListEntry>, RelationError> {
        let entries = sqlx::query_as::<_, ShoppingListEntry>(
            r#"
            SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            JOIN cart_items c ON c.recipe_id = ri.recipe_id
            WHERE c.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name, i.measurement_unit
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_link_tables() {
        assert_eq!(RecipeLink::Favorite.table(), "favorites");
        assert_eq!(RecipeLink::Cart.table(), "cart_items");
    }

    #[tokio::test]
    async fn test_self_follow_rejected_without_database() {
        // add_follow checks identity before touching the pool, so a closed
        // lazy pool never sees a query
        let pool = PgPool::connect_lazy("postgresql://localhost/unused").unwrap();
        let repo = RelationRepository::new(pool);
        let user = Uuid::new_v4();

        let result = repo.add_follow(user, user).await;
        assert!(matches!(result, Err(RelationError::SelfFollow)));
    }
}
