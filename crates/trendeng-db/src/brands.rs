//! Database operations for the `brands` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Returns the brand named `name`, creating it first if needed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_brand(pool: &PgPool, name: &str) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(
        "INSERT INTO brands (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, name, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all brands ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(pool: &PgPool) -> Result<Vec<BrandRow>, DbError> {
    let rows =
        sqlx::query_as::<_, BrandRow>("SELECT id, name, created_at FROM brands ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(rows)
}
