//! Database operations for `search_queries` and their `filters`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendeng_core::Region;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `search_queries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchQueryRow {
    pub id: i64,
    pub query: String,
    pub category: String,
    pub region: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A row from the `filters` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FilterRow {
    pub id: i64,
    pub search_query_id: i64,
    pub name: String,
    pub filter_type: String,
    pub created_at: DateTime<Utc>,
}

const SEARCH_QUERY_COLUMNS: &str = "id, query, category, region, is_active, created_at";
const FILTER_COLUMNS: &str = "id, search_query_id, name, filter_type, created_at";

// ---------------------------------------------------------------------------
// search_queries
// ---------------------------------------------------------------------------

/// Active search queries tracked for `region`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_search_queries(
    pool: &PgPool,
    region: Region,
) -> Result<Vec<SearchQueryRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchQueryRow>(&format!(
        "SELECT {SEARCH_QUERY_COLUMNS} FROM search_queries \
         WHERE region = $1 AND is_active = true \
         ORDER BY id"
    ))
    .bind(region.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetches a single search query by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_search_query(pool: &PgPool, id: i64) -> Result<SearchQueryRow, DbError> {
    sqlx::query_as::<_, SearchQueryRow>(&format!(
        "SELECT {SEARCH_QUERY_COLUMNS} FROM search_queries WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Looks up a search query by `(query, region)` and inserts it when absent.
///
/// An existing row keeps its id; its category and active flag are refreshed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn get_or_create_search_query(
    pool: &PgPool,
    query: &str,
    category: &str,
    region: Region,
    is_active: bool,
) -> Result<SearchQueryRow, DbError> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM search_queries WHERE query = $1 AND region = $2 ORDER BY id LIMIT 1",
    )
    .bind(query)
    .bind(region.as_str())
    .fetch_optional(pool)
    .await?;

    let row = match existing {
        Some(id) => {
            sqlx::query_as::<_, SearchQueryRow>(&format!(
                "UPDATE search_queries SET category = $1, is_active = $2 \
                 WHERE id = $3 \
                 RETURNING {SEARCH_QUERY_COLUMNS}"
            ))
            .bind(category)
            .bind(is_active)
            .bind(id)
            .fetch_one(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SearchQueryRow>(&format!(
                "INSERT INTO search_queries (query, category, region, is_active) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING {SEARCH_QUERY_COLUMNS}"
            ))
            .bind(query)
            .bind(category)
            .bind(region.as_str())
            .bind(is_active)
            .fetch_one(pool)
            .await?
        }
    };

    Ok(row)
}

// ---------------------------------------------------------------------------
// filters
// ---------------------------------------------------------------------------

/// Returns the filter `(search_query_id, name)`, inserting it when absent.
///
/// There is no unique constraint behind this pair; two concurrent callers
/// can both insert.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn get_or_create_filter(
    pool: &PgPool,
    search_query_id: i64,
    name: &str,
    filter_type: &str,
) -> Result<FilterRow, DbError> {
    let existing = sqlx::query_as::<_, FilterRow>(&format!(
        "SELECT {FILTER_COLUMNS} FROM filters \
         WHERE search_query_id = $1 AND name = $2 \
         ORDER BY id LIMIT 1"
    ))
    .bind(search_query_id)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    if let Some(row) = existing {
        return Ok(row);
    }

    let row = sqlx::query_as::<_, FilterRow>(&format!(
        "INSERT INTO filters (search_query_id, name, filter_type) \
         VALUES ($1, $2, $3) \
         RETURNING {FILTER_COLUMNS}"
    ))
    .bind(search_query_id)
    .bind(name)
    .bind(filter_type)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Filters recorded for a search query, grouped by type.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_filters_for_search_query(
    pool: &PgPool,
    search_query_id: i64,
) -> Result<Vec<FilterRow>, DbError> {
    let rows = sqlx::query_as::<_, FilterRow>(&format!(
        "SELECT {FILTER_COLUMNS} FROM filters \
         WHERE search_query_id = $1 \
         ORDER BY filter_type, name"
    ))
    .bind(search_query_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
