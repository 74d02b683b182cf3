//! Catalog products keyed by the provider's external product id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::PgPool;
use trendeng_core::CatalogProductRecord;

use crate::DbError;

/// A row from the `catalog_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogProductRow {
    pub id: i64,
    pub external_id: String,
    pub search_query_id: i64,
    pub region: String,
    pub title: String,
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    pub thumbnail_url: Option<String>,
    pub store_name: Option<String>,
    pub store_link: Option<String>,
    pub rating: Option<Decimal>,
    pub reviews: Option<i32>,
    pub variants: Option<Value>,
    pub other_details: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const CATALOG_PRODUCT_COLUMNS: &str =
    "id, external_id, search_query_id, region, title, brand, price, thumbnail_url, \
     store_name, store_link, rating, reviews, variants, other_details, created_at, updated_at";

/// Inserts a catalog product or merges it into the row with the same
/// `external_id`.
///
/// Required fields (`search_query_id`, `region`, `title`) always take the new
/// value. Optional fields only overwrite when the record carries a value, so
/// a sparse payload never erases what an earlier sync stored.
///
/// Returns the row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_catalog_product(
    pool: &PgPool,
    record: &CatalogProductRecord,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO catalog_products \
             (external_id, search_query_id, region, title, brand, price, thumbnail_url, \
              store_name, store_link, rating, reviews, variants, other_details) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         ON CONFLICT (external_id) DO UPDATE SET \
             search_query_id = EXCLUDED.search_query_id, \
             region          = EXCLUDED.region, \
             title           = EXCLUDED.title, \
             brand           = COALESCE(EXCLUDED.brand, catalog_products.brand), \
             price           = COALESCE(EXCLUDED.price, catalog_products.price), \
             thumbnail_url   = COALESCE(EXCLUDED.thumbnail_url, catalog_products.thumbnail_url), \
             store_name      = COALESCE(EXCLUDED.store_name, catalog_products.store_name), \
             store_link      = COALESCE(EXCLUDED.store_link, catalog_products.store_link), \
             rating          = COALESCE(EXCLUDED.rating, catalog_products.rating), \
             reviews         = COALESCE(EXCLUDED.reviews, catalog_products.reviews), \
             variants        = COALESCE(EXCLUDED.variants, catalog_products.variants), \
             other_details   = COALESCE(EXCLUDED.other_details, catalog_products.other_details), \
             updated_at      = NOW() \
         RETURNING id",
    )
    .bind(&record.external_id)
    .bind(record.search_query_id)
    .bind(record.region.as_str())
    .bind(&record.title)
    .bind(&record.brand)
    .bind(record.price)
    .bind(&record.thumbnail_url)
    .bind(&record.store_name)
    .bind(&record.store_link)
    .bind(record.rating)
    .bind(record.reviews)
    .bind(&record.variants)
    .bind(&record.other_details)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Fetches a catalog product by its external id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_catalog_product_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<CatalogProductRow>, DbError> {
    let row = sqlx::query_as::<_, CatalogProductRow>(&format!(
        "SELECT {CATALOG_PRODUCT_COLUMNS} FROM catalog_products WHERE external_id = $1"
    ))
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
