//! Read access to the seeded `categories` tree.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Resolves a category slug to its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_category_id_by_slug(pool: &PgPool, slug: &str) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;

    Ok(id)
}

/// Returns every category, parents before children.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<CategoryRow>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, slug, parent_id, created_at \
         FROM categories \
         ORDER BY parent_id NULLS FIRST, name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
