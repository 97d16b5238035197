//! Recipe repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::filters::{RecipeFilter, escape_like};
use crate::models::recipe::{
    IngredientAmount, Recipe, RecipeIngredientView, RecipeSummaryView, RecipeUpdateRequest,
    RecipeWriteRequest,
};
use crate::models::tag::Tag;

const RECIPE_COLUMNS: &str = "id, author_id, name, text, cooking_time, image, pub_date";

/// Recipe repository
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a recipe with its tag and ingredient links in one transaction
    pub async fn create(
        &self,
        author_id: Uuid,
        payload: &RecipeWriteRequest,
        image_path: &str,
    ) -> Result<Recipe> {
        let mut tx = self.pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (author_id, name, text, cooking_time, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(author_id)
        .bind(&payload.name)
        .bind(&payload.text)
        .bind(payload.cooking_time)
        .bind(image_path)
        .fetch_one(&mut *tx)
        .await?;

        replace_tags(&mut tx, recipe.id, &payload.tags, false).await?;
        replace_ingredients(&mut tx, recipe.id, &payload.ingredients, false).await?;

        tx.commit().await?;
        Ok(recipe)
    }

    /// Apply a partial update. Supplied tag and ingredient lists replace
    /// the full existing sets; omitted fields keep their prior values.
    pub async fn update(
        &self,
        recipe_id: Uuid,
        payload: &RecipeUpdateRequest,
        image_path: Option<&str>,
    ) -> Result<Recipe> {
        let mut tx = self.pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET name = COALESCE($1, name),
                text = COALESCE($2, text),
                cooking_time = COALESCE($3, cooking_time),
                image = COALESCE($4, image)
            WHERE id = $5
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(payload.name.as_deref())
        .bind(payload.text.as_deref())
        .bind(payload.cooking_time)
        .bind(image_path)
        .bind(recipe_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(tags) = &payload.tags {
            replace_tags(&mut tx, recipe_id, tags, true).await?;
        }
        if let Some(ingredients) = &payload.ingredients {
            replace_ingredients(&mut tx, recipe_id, ingredients, true).await?;
        }

        tx.commit().await?;
        Ok(recipe)
    }

    /// Delete a recipe; dependent join rows cascade at the store layer.
    /// Returns false if the recipe did not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Find a recipe by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>> {
        let recipe = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipe)
    }

    /// List recipes matching the filter, newest first
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Recipe>, i64)> {
        let offset = (page as i64 - 1) * limit as i64;

        let mut query = filtered_query(
            "SELECT DISTINCT r.id, r.author_id, r.name, r.text, r.cooking_time, \
             r.image, r.pub_date FROM recipes r",
            filter,
        );
        query
            .push(" ORDER BY r.pub_date DESC, r.id")
            .push(" LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let recipes = query
            .build_query_as::<Recipe>()
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = filtered_query("SELECT COUNT(DISTINCT r.id) FROM recipes r", filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((recipes, total))
    }

    /// Tags attached to a recipe
    pub async fn tags_for(&self, recipe_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.slug, t.color
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Ingredient lines of a recipe, with names and units resolved
    pub async fn ingredients_for(&self, recipe_id: Uuid) -> Result<Vec<RecipeIngredientView>> {
        let ingredients = sqlx::query_as::<_, RecipeIngredientView>(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ingredients)
    }

    /// The viewer's derived flags for one recipe; both false when anonymous
    pub async fn viewer_flags(
        &self,
        recipe_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<(bool, bool)> {
        let (is_favorited, is_in_shopping_cart): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM favorites WHERE recipe_id = $1 AND user_id = $2),
                EXISTS(SELECT 1 FROM cart_items WHERE recipe_id = $1 AND user_id = $2)
            "#,
        )
        .bind(recipe_id)
        .bind(viewer)
        .fetch_one(&self.pool)
        .await?;

        Ok((is_favorited, is_in_shopping_cart))
    }

    /// Short views of an author's recipes, newest first
    pub async fn summaries_by_author(&self, author_id: Uuid) -> Result<Vec<RecipeSummaryView>> {
        let recipes = sqlx::query_as::<_, RecipeSummaryView>(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY pub_date DESC, id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(recipes)
    }

    /// Number of recipes an author has published
    pub async fn count_by_author(&self, author_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Build the shared FROM/JOIN/WHERE clause for the recipe listing.
/// Used for both the page query and the matching count.
fn filtered_query(select: &str, filter: &RecipeFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(select.to_string());

    if !filter.tag_slugs.is_empty() {
        query.push(" JOIN recipe_tags rt ON rt.recipe_id = r.id JOIN tags t ON t.id = rt.tag_id");
    }

    query.push(" WHERE TRUE");

    if let Some(name) = &filter.name {
        query
            .push(" AND r.name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)));
    }
    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }
    if !filter.tag_slugs.is_empty() {
        query
            .push(" AND t.slug = ANY(")
            .push_bind(filter.tag_slugs.clone())
            .push(")");
    }
    if let Some(user_id) = filter.favorited_by {
        query
            .push(" AND EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
    if let Some(user_id) = filter.in_cart_of {
        query
            .push(" AND EXISTS(SELECT 1 FROM cart_items c WHERE c.recipe_id = r.id AND c.user_id = ")
            .push_bind(user_id)
            .push(")");
    }

    query
}

/// Attach tags to a recipe, optionally clearing the existing set first
async fn replace_tags(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    tags: &[Uuid],
    clear_existing: bool,
) -> Result<()> {
    if clear_existing {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut **tx)
            .await?;
    }

    for tag_id in tags {
        sqlx::query(
            "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Attach ingredient quantities to a recipe, optionally clearing the
/// existing set first. A duplicate (recipe, ingredient) pair merges by
/// summing amounts instead of duplicating the row, mirroring the store's
/// uniqueness constraint.
async fn replace_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    ingredients: &[IngredientAmount],
    clear_existing: bool,
) -> Result<()> {
    if clear_existing {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut **tx)
            .await?;
    }

    for entry in ingredients {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (recipe_id, ingredient_id)
            DO UPDATE SET amount = recipe_ingredients.amount + EXCLUDED.amount
            "#,
        )
        .bind(recipe_id)
        .bind(entry.id)
        .bind(entry.amount)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_query_no_predicates() {
        let filter = RecipeFilter::default();
        let sql = filtered_query("SELECT COUNT(DISTINCT r.id) FROM recipes r", &filter).into_sql();
        assert_eq!(sql, "SELECT COUNT(DISTINCT r.id) FROM recipes r WHERE TRUE");
    }

    #[test]
    fn test_filtered_query_joins_tags_once() {
        let filter = RecipeFilter {
            tag_slugs: vec!["breakfast".into(), "vegan".into()],
            ..Default::default()
        };
        let sql = filtered_query("SELECT COUNT(DISTINCT r.id) FROM recipes r", &filter).into_sql();
        assert_eq!(sql.matches("JOIN recipe_tags").count(), 1);
        assert!(sql.contains("t.slug = ANY("));
    }

    #[test]
    fn test_filtered_query_combines_predicates_with_and() {
        let filter = RecipeFilter {
            name: Some("soup".into()),
            author: Some(Uuid::new_v4()),
            favorited_by: Some(Uuid::new_v4()),
            in_cart_of: Some(Uuid::new_v4()),
            ..Default::default()
        };
        let sql = filtered_query("SELECT COUNT(DISTINCT r.id) FROM recipes r", &filter).into_sql();
        assert!(sql.contains("r.name ILIKE"));
        assert!(sql.contains("r.author_id ="));
        assert!(sql.contains("FROM favorites f"));
        assert!(sql.contains("FROM cart_items c"));
        assert_eq!(sql.matches(" AND EXISTS(").count(), 2);
    }
}
