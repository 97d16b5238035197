//! Query-parameter filtering for listings
//!
//! All recipe predicates are AND-combined; tag slugs are OR within the one
//! predicate. The favorites/cart flags restrict to the requesting user and
//! are ignored for anonymous callers.

use serde::Deserialize;
use uuid::Uuid;

/// Raw query parameters accepted by the recipe listing.
///
/// Extracted with `axum_extra::extract::Query` so the repeated
/// `tags=a&tags=b` form collects into a Vec.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub author: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// Resolved recipe filter, with the acting user already applied
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Case-insensitive substring match on the recipe name
    pub name: Option<String>,
    /// Exact author match
    pub author: Option<Uuid>,
    /// Tag slug membership, OR across slugs, deduplicated
    pub tag_slugs: Vec<String>,
    /// Restrict to recipes favorited by this user
    pub favorited_by: Option<Uuid>,
    /// Restrict to recipes in this user's shopping cart
    pub in_cart_of: Option<Uuid>,
}

impl RecipeFilter {
    /// Build a filter from raw query parameters and the viewer identity
    pub fn from_query(query: &RecipeQuery, viewer: Option<Uuid>) -> Self {
        let mut tag_slugs = query.tags.clone();
        tag_slugs.sort();
        tag_slugs.dedup();

        Self {
            name: query.name.clone().filter(|n| !n.is_empty()),
            author: query.author,
            tag_slugs,
            favorited_by: viewer.filter(|_| flag_is_set(query.is_favorited.as_deref())),
            in_cart_of: viewer.filter(|_| flag_is_set(query.is_in_shopping_cart.as_deref())),
        }
    }
}

/// Query parameters accepted by the ingredient listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive substring match on the ingredient name
    pub name: Option<String>,
}

/// Plain page/limit query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Interpret a boolean query flag; accepts "1" and "true" (any case)
pub fn flag_is_set(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Escape LIKE metacharacters so user input matches literally
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_set() {
        assert!(flag_is_set(Some("1")));
        assert!(flag_is_set(Some("true")));
        assert!(flag_is_set(Some("True")));
        assert!(!flag_is_set(Some("0")));
        assert!(!flag_is_set(Some("false")));
        assert!(!flag_is_set(None));
    }

    #[test]
    fn test_filter_dedupes_tag_slugs() {
        let query = RecipeQuery {
            tags: vec!["dinner".into(), "vegan".into(), "dinner".into()],
            ..Default::default()
        };
        let filter = RecipeFilter::from_query(&query, None);
        assert_eq!(filter.tag_slugs, vec!["dinner".to_string(), "vegan".to_string()]);
    }

    #[test]
    fn test_filter_flags_require_viewer() {
        let query = RecipeQuery {
            is_favorited: Some("1".into()),
            is_in_shopping_cart: Some("true".into()),
            ..Default::default()
        };

        let anonymous = RecipeFilter::from_query(&query, None);
        assert!(anonymous.favorited_by.is_none());
        assert!(anonymous.in_cart_of.is_none());

        let viewer = Uuid::new_v4();
        let signed_in = RecipeFilter::from_query(&query, Some(viewer));
        assert_eq!(signed_in.favorited_by, Some(viewer));
        assert_eq!(signed_in.in_cart_of, Some(viewer));
    }

    #[test]
    fn test_filter_ignores_unset_flags() {
        let query = RecipeQuery {
            is_favorited: Some("0".into()),
            ..Default::default()
        };
        let filter = RecipeFilter::from_query(&query, Some(Uuid::new_v4()));
        assert!(filter.favorited_by.is_none());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("flour"), "flour");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_filter_drops_empty_name() {
        let query = RecipeQuery {
            name: Some(String::new()),
            ..Default::default()
        };
        let filter = RecipeFilter::from_query(&query, None);
        assert!(filter.name.is_none());
    }
}
