//! API models for request and response payloads
//!
//! Entities map rows one-to-one; the `*View` types are the named output
//! projections handlers select explicitly for each response context.

use serde::Serialize;

pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

/// Paginated list response
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Default number of items per page
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
/// Upper bound on items per page
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Clamp raw `page`/`limit` query values to their allowed ranges
pub fn clamp_page(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_defaults() {
        assert_eq!(clamp_page(None, None), (1, DEFAULT_PAGE_LIMIT));
    }

    #[test]
    fn test_clamp_page_bounds() {
        assert_eq!(clamp_page(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_page(Some(3), Some(1000)), (3, MAX_PAGE_LIMIT));
    }
}
