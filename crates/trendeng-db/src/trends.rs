//! Database operations for the `trends` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendeng_core::NewTrend;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `trends` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRow {
    pub id: i64,
    pub name: String,
    pub region: String,
    /// Canonical category slug.
    pub category: String,
    pub source: String,
    pub score: i64,
    pub description: Option<String>,
    pub inspiration_images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

const TREND_COLUMNS: &str = "id, name, region, category, source, score, description, \
                             inspiration_images, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the trend with the given id, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_trend_by_id(pool: &PgPool, id: i64) -> Result<Option<TrendRow>, DbError> {
    let row = sqlx::query_as::<_, TrendRow>(&format!(
        "SELECT {TREND_COLUMNS} FROM trends WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the oldest trend matching `(name, region)`, comparing the region
/// case-insensitively.
///
/// The pair is not unique in the schema, so concurrent writers may have
/// produced more than one row; the first one created wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_trend_by_name_and_region(
    pool: &PgPool,
    name: &str,
    region: &str,
) -> Result<Option<TrendRow>, DbError> {
    let row = sqlx::query_as::<_, TrendRow>(&format!(
        "SELECT {TREND_COLUMNS} FROM trends \
         WHERE name = $1 AND UPPER(region) = UPPER($2) \
         ORDER BY id \
         LIMIT 1"
    ))
    .bind(name)
    .bind(region)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a trend and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_trend(pool: &PgPool, trend: &NewTrend) -> Result<TrendRow, DbError> {
    let row = sqlx::query_as::<_, TrendRow>(&format!(
        "INSERT INTO trends \
             (name, region, category, source, score, description, inspiration_images) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {TREND_COLUMNS}"
    ))
    .bind(&trend.name)
    .bind(&trend.region)
    .bind(&trend.category)
    .bind(&trend.source)
    .bind(trend.score)
    .bind(&trend.description)
    .bind(&trend.inspiration_images)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
