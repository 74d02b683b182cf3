use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use trendeng_db::DbError;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct FilterItem {
    id: i64,
    name: String,
    filter_type: String,
}

pub(super) async fn list_filters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(search_query_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FilterItem>>>, ApiError> {
    match trendeng_db::get_search_query(&state.pool, search_query_id).await {
        Ok(_) => {}
        Err(DbError::NotFound) => {
            return Err(ApiError::new(
                req_id.0,
                "not_found",
                "search query not found",
            ));
        }
        Err(e) => return Err(map_db_error(req_id.0, &e)),
    }

    let rows = trendeng_db::list_filters_for_search_query(&state.pool, search_query_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| FilterItem {
            id: row.id,
            name: row.name,
            filter_type: row.filter_type,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
