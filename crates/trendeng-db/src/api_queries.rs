//! Read-model queries used by `trendeng-server` list endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{CatalogProductRow, DbError};

/// Trend list row with the number of associated products.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendSummaryRow {
    pub id: i64,
    pub name: String,
    pub region: String,
    pub category: String,
    pub source: String,
    pub score: i64,
    pub description: Option<String>,
    pub inspiration_images: Vec<String>,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Input filters for trend listing.
#[derive(Debug, Clone, Default)]
pub struct TrendListFilters<'a> {
    pub region: Option<&'a str>,
    pub category: Option<&'a str>,
    pub limit: i64,
}

/// Input filters for catalog product listing.
///
/// `category` matches the owning search query's category; `brand` is a
/// case-insensitive literal substring (`%` and `_` match themselves).
#[derive(Debug, Clone, Default)]
pub struct CatalogProductFilters<'a> {
    pub region: Option<&'a str>,
    pub category: Option<&'a str>,
    pub brand: Option<&'a str>,
    pub price_max: Option<Decimal>,
    pub limit: i64,
}

/// Returns trends, highest score first, each with its product count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trends_with_counts(
    pool: &PgPool,
    filters: TrendListFilters<'_>,
) -> Result<Vec<TrendSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendSummaryRow>(
        "SELECT t.id, t.name, t.region, t.category, t.source, t.score, t.description, \
                t.inspiration_images, \
                (SELECT COUNT(*) FROM trend_products tp WHERE tp.trend_id = t.id) AS product_count, \
                t.created_at \
         FROM trends t \
         WHERE ($1::TEXT IS NULL OR UPPER(t.region) = UPPER($1)) \
           AND ($2::TEXT IS NULL OR t.category = $2) \
         ORDER BY t.score DESC, t.created_at DESC, t.id DESC \
         LIMIT $3",
    )
    .bind(filters.region)
    .bind(filters.category)
    .bind(filters.limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns catalog products matching the filters, most recently updated first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_catalog_products(
    pool: &PgPool,
    filters: CatalogProductFilters<'_>,
) -> Result<Vec<CatalogProductRow>, DbError> {
    let rows = sqlx::query_as::<_, CatalogProductRow>(
        "SELECT cp.id, cp.external_id, cp.search_query_id, cp.region, cp.title, cp.brand, \
                cp.price, cp.thumbnail_url, cp.store_name, cp.store_link, cp.rating, \
                cp.reviews, cp.variants, cp.other_details, cp.created_at, cp.updated_at \
         FROM catalog_products cp \
         JOIN search_queries sq ON sq.id = cp.search_query_id \
         WHERE ($1::TEXT IS NULL OR cp.region = UPPER($1)) \
           AND ($2::TEXT IS NULL OR sq.category = $2) \
           AND ($3::TEXT IS NULL OR cp.brand ILIKE $3 ESCAPE '\\') \
           AND ($4::NUMERIC IS NULL OR cp.price <= $4) \
         ORDER BY cp.updated_at DESC, cp.id DESC \
         LIMIT $5",
    )
    .bind(filters.region)
    .bind(filters.category)
    .bind(filters.brand.map(contains_pattern))
    .bind(filters.price_max)
    .bind(filters.limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// `%value%` with LIKE metacharacters in `value` escaped by backslash.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
