use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, parse_region, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct TrendsQuery {
    pub region: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendItem {
    id: i64,
    name: String,
    region: String,
    category: String,
    source: String,
    score: i64,
    description: Option<String>,
    inspiration_images: Vec<String>,
    product_count: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct TrendProductItem {
    id: i64,
    title: String,
    link: Option<String>,
    price: Option<String>,
    thumbnail: Option<String>,
    store: String,
    brand: Option<String>,
    created_at: DateTime<Utc>,
}

pub(super) async fn list_trends(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendItem>>>, ApiError> {
    let region = parse_region(&req_id.0, query.region.as_deref())?;

    let rows = trendeng_db::list_trends_with_counts(
        &state.pool,
        trendeng_db::TrendListFilters {
            region,
            category: query.category.as_deref(),
            limit: normalize_limit(query.limit),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| TrendItem {
            id: row.id,
            name: row.name,
            region: row.region,
            category: row.category,
            source: row.source,
            score: row.score,
            description: row.description,
            inspiration_images: row.inspiration_images,
            product_count: row.product_count,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn list_trend_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(trend_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<TrendProductItem>>>, ApiError> {
    let trend = trendeng_db::get_trend_by_id(&state.pool, trend_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    if trend.is_none() {
        return Err(ApiError::new(req_id.0, "not_found", "trend not found"));
    }

    let rows = trendeng_db::list_trend_products(&state.pool, trend_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| TrendProductItem {
            id: row.id,
            title: row.title,
            link: row.link,
            price: row.price,
            thumbnail: row.thumbnail,
            store: row.store_name,
            brand: row.brand_name,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
