//! Tag entity

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recipe tag. Read-only through the API; rows are seeded by operators.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    /// URL-safe unique slug used by recipe filtering
    pub slug: String,
    /// Unique display color in HEX notation
    pub color: String,
}
