//! Trend-linked products and their trend/category associations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendeng_core::NewTrendProduct;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A trend-linked product joined with its store and brand names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendProductRow {
    pub id: i64,
    pub title: String,
    pub link: Option<String>,
    pub price: Option<String>,
    pub thumbnail: Option<String>,
    pub store_id: i64,
    pub store_name: String,
    pub brand_id: Option<i64>,
    pub brand_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a product and links it to `trend_id` and, when given, to
/// `category_id`. All three writes share one transaction.
///
/// Returns the new product id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any write fails; nothing is persisted in
/// that case.
pub async fn create_trend_product(
    pool: &PgPool,
    trend_id: i64,
    category_id: Option<i64>,
    product: &NewTrendProduct,
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let product_id: i64 = sqlx::query_scalar(
        "INSERT INTO products (title, link, price, thumbnail, store_id, brand_id) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(&product.title)
    .bind(&product.link)
    .bind(&product.price)
    .bind(&product.thumbnail)
    .bind(product.store_id)
    .bind(product.brand_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO trend_products (trend_id, product_id) VALUES ($1, $2)")
        .bind(trend_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    if let Some(category_id) = category_id {
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(product_id)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Number of products associated with a trend.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_trend_products(pool: &PgPool, trend_id: i64) -> Result<i64, DbError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trend_products WHERE trend_id = $1")
            .bind(trend_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Products linked to a trend, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trend_products(
    pool: &PgPool,
    trend_id: i64,
) -> Result<Vec<TrendProductRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendProductRow>(
        "SELECT p.id, p.title, p.link, p.price, p.thumbnail, \
                p.store_id, s.name AS store_name, \
                p.brand_id, b.name AS brand_name, p.created_at \
         FROM trend_products tp \
         JOIN products p ON p.id = tp.product_id \
         JOIN stores s ON s.id = p.store_id \
         LEFT JOIN brands b ON b.id = p.brand_id \
         WHERE tp.trend_id = $1 \
         ORDER BY p.created_at DESC, p.id DESC",
    )
    .bind(trend_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
