//! Database operations for the `stores` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub name: String,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Returns the store named `name`, creating it first if needed.
///
/// Relies on the unique constraint on `stores.name`, so concurrent callers
/// converge on a single row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn get_or_create_store(pool: &PgPool, name: &str) -> Result<StoreRow, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(
        "INSERT INTO stores (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, name, logo_url, created_at",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all stores ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stores(pool: &PgPool) -> Result<Vec<StoreRow>, DbError> {
    let rows = sqlx::query_as::<_, StoreRow>(
        "SELECT id, name, logo_url, created_at FROM stores ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
