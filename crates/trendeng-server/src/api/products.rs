use std::str::FromStr;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, parse_region, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub region: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_max: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CatalogProductItem {
    id: i64,
    external_id: String,
    search_query_id: i64,
    region: String,
    title: String,
    brand: Option<String>,
    price: Option<Decimal>,
    thumbnail_url: Option<String>,
    store_name: Option<String>,
    store_link: Option<String>,
    rating: Option<Decimal>,
    reviews: Option<i32>,
    variants: Option<serde_json::Value>,
    other_details: Option<serde_json::Value>,
    updated_at: DateTime<Utc>,
}

fn parse_price_max(request_id: &str, raw: Option<&str>) -> Result<Option<Decimal>, ApiError> {
    match raw.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(p) => match Decimal::from_str(p) {
            Ok(value) if value >= Decimal::ZERO => Ok(Some(value)),
            _ => Err(ApiError::new(
                request_id,
                "validation_error",
                format!("price_max must be a non-negative number, got '{p}'"),
            )),
        },
    }
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<CatalogProductItem>>>, ApiError> {
    let region = parse_region(&req_id.0, query.region.as_deref())?;
    let price_max = parse_price_max(&req_id.0, query.price_max.as_deref())?;

    let rows = trendeng_db::list_catalog_products(
        &state.pool,
        trendeng_db::CatalogProductFilters {
            region,
            category: query.category.as_deref(),
            brand: query.brand.as_deref().filter(|b| !b.trim().is_empty()),
            price_max,
            limit: normalize_limit(query.limit),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| CatalogProductItem {
            id: row.id,
            external_id: row.external_id,
            search_query_id: row.search_query_id,
            region: row.region,
            title: row.title,
            brand: row.brand,
            price: row.price,
            thumbnail_url: row.thumbnail_url,
            store_name: row.store_name,
            store_link: row.store_link,
            rating: row.rating,
            reviews: row.reviews,
            variants: row.variants,
            other_details: row.other_details,
            updated_at: row.updated_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
