use std::str::FromStr;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use rust_decimal::Decimal;
use tower::ServiceExt;
use trendeng_core::{CatalogProductRecord, CategoryConfig, NewTrend, NewTrendProduct, Region};

use super::*;

async fn get_json(pool: sqlx::PgPool, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = build_app(AppState { pool });
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

async fn seed_trend(pool: &sqlx::PgPool, name: &str, region: &str, score: i64) -> i64 {
    trendeng_db::insert_trend(
        pool,
        &NewTrend {
            name: name.to_string(),
            region: region.to_string(),
            category: "acessorios".to_string(),
            source: "TikTok".to_string(),
            score,
            description: None,
            inspiration_images: Vec::new(),
        },
    )
    .await
    .expect("insert trend")
    .id
}

async fn link_product(pool: &sqlx::PgPool, trend_id: i64, title: &str, store: &str) {
    let store_id = trendeng_db::get_or_create_store(pool, store)
        .await
        .expect("store")
        .id;
    trendeng_db::create_trend_product(
        pool,
        trend_id,
        None,
        &NewTrendProduct {
            title: title.to_string(),
            link: Some(format!("https://{store}.example/{title}")),
            price: Some("R$ 89,90".to_string()),
            thumbnail: None,
            store_id,
            brand_id: None,
        },
    )
    .await
    .expect("trend product");
}

fn catalog_record(external_id: &str, sq_id: i64, brand: &str, price: &str) -> CatalogProductRecord {
    CatalogProductRecord {
        external_id: external_id.to_string(),
        search_query_id: sq_id,
        region: Region::Br,
        title: format!("{brand} item"),
        brand: Some(brand.to_string()),
        price: Some(Decimal::from_str(price).unwrap()),
        thumbnail_url: None,
        store_name: Some("Netshoes".to_string()),
        store_link: None,
        rating: None,
        reviews: None,
        variants: None,
        other_details: None,
    }
}

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 50);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(1_000)), 200);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn api_error_codes_map_to_status() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = ApiError::new("req-1", "not_found", "missing").into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn parse_region_normalizes_case() {
    assert_eq!(parse_region("r", Some("br")).unwrap(), Some("BR"));
    assert_eq!(parse_region("r", Some("")).unwrap(), None);
    assert_eq!(parse_region("r", None).unwrap(), None);
    assert!(parse_region("r", Some("JP")).is_err());
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_database_ok(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert!(json["meta"]["request_id"].as_str().is_some());
    assert!(json["meta"]["timestamp"].as_str().is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn request_id_header_is_echoed(pool: sqlx::PgPool) {
    let app = build_app(AppState { pool });
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn trends_are_ordered_by_score_with_product_counts(pool: sqlx::PgPool) {
    let cargo = seed_trend(&pool, "Cargo Pants", "BR", 90).await;
    seed_trend(&pool, "Saia Midi", "BR", 10).await;
    seed_trend(&pool, "Loafers", "US", 50).await;
    link_product(&pool, cargo, "Calça Cargo", "Renner").await;
    link_product(&pool, cargo, "Calça Cargo Jeans", "Zara").await;

    let (status, json) = get_json(pool, "/api/v1/trends?region=br").await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Cargo Pants");
    assert_eq!(data[0]["product_count"].as_i64(), Some(2));
    assert_eq!(data[1]["product_count"].as_i64(), Some(0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn trends_reject_unknown_region(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/api/v1/trends?region=JP").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(json["meta"]["request_id"].as_str().is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn trend_products_list_store_names(pool: sqlx::PgPool) {
    let trend_id = seed_trend(&pool, "Cargo Pants", "BR", 1).await;
    link_product(&pool, trend_id, "Calça Cargo", "Renner").await;

    let (status, json) = get_json(pool, &format!("/api/v1/trends/{trend_id}/products")).await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["store"], "Renner");
    assert_eq!(data[0]["price"], "R$ 89,90");
}

#[sqlx::test(migrations = "../../migrations")]
async fn trend_products_for_unknown_trend_is_404(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/api/v1/trends/999999/products").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn products_filter_by_brand_substring_and_price(pool: sqlx::PgPool) {
    let sq_id = trendeng_db::get_or_create_search_query(&pool, "tenis", "calcados", Region::Br, true)
        .await
        .expect("search query")
        .id;
    for record in [
        catalog_record("A1", sq_id, "Adidas", "599.90"),
        catalog_record("A2", sq_id, "Adidas Originals", "199.90"),
        catalog_record("N1", sq_id, "Nike", "149.90"),
    ] {
        trendeng_db::upsert_catalog_product(&pool, &record)
            .await
            .expect("upsert");
    }

    let (status, json) = get_json(
        pool,
        "/api/v1/products?region=BR&category=calcados&brand=adidas&price_max=300",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["external_id"], "A2");
}

#[sqlx::test(migrations = "../../migrations")]
async fn products_reject_bad_price_max(pool: sqlx::PgPool) {
    let (status, json) = get_json(pool, "/api/v1/products?price_max=cheap").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_query_filters_and_missing_query(pool: sqlx::PgPool) {
    let sq_id = trendeng_db::get_or_create_search_query(&pool, "bolsa", "acessorios", Region::Br, true)
        .await
        .expect("search query")
        .id;
    trendeng_db::get_or_create_filter(&pool, sq_id, "Couro", "Material")
        .await
        .expect("filter");

    let (status, json) =
        get_json(pool.clone(), &format!("/api/v1/search-queries/{sq_id}/filters")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["name"], "Couro");
    assert_eq!(json["data"][0]["filter_type"], "Material");

    let (status, _) = get_json(pool, "/api/v1/search-queries/999999/filters").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn categories_list_seeded_tree(pool: sqlx::PgPool) {
    trendeng_db::seed_categories(
        &pool,
        &[CategoryConfig {
            name: "Roupas".to_string(),
            slug: None,
            children: vec![CategoryConfig {
                name: "Vestidos".to_string(),
                slug: None,
                children: Vec::new(),
            }],
        }],
    )
    .await
    .expect("seed");

    let (status, json) = get_json(pool, "/api/v1/categories").await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["slug"], "roupas");
    assert!(data[0]["parent_id"].is_null());
    assert_eq!(data[1]["parent_id"], data[0]["id"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn stores_and_brands_are_listed(pool: sqlx::PgPool) {
    trendeng_db::get_or_create_store(&pool, "Renner")
        .await
        .expect("store");
    trendeng_db::get_or_create_brand(&pool, "Nike")
        .await
        .expect("brand");

    let (status, stores) = get_json(pool.clone(), "/api/v1/stores").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stores["data"][0]["name"], "Renner");

    let (status, brands) = get_json(pool, "/api/v1/brands").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(brands["data"][0]["name"], "Nike");
}
