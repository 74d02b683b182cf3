//! Reference lists: stores, brands and the category tree.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StoreItem {
    id: i64,
    name: String,
    logo_url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct BrandItem {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryItem {
    id: i64,
    name: String,
    slug: String,
    parent_id: Option<i64>,
}

pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StoreItem>>>, ApiError> {
    let rows = trendeng_db::list_stores(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| StoreItem {
            id: row.id,
            name: row.name,
            logo_url: row.logo_url,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<BrandItem>>>, ApiError> {
    let rows = trendeng_db::list_brands(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| BrandItem {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<CategoryItem>>>, ApiError> {
    let rows = trendeng_db::list_categories(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| CategoryItem {
            id: row.id,
            name: row.name,
            slug: row.slug,
            parent_id: row.parent_id,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
