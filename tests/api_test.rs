//! HTTP surface tests driven through the router without a socket

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use product_search::api::{build_router, AppState};
use product_search::search::ProductSearchService;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn router(service: ProductSearchService) -> Router {
    build_router(AppState::new(Arc::new(service)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn search_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/product")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_search_endpoint_returns_camel_case_body() {
    let (_dir, service) = common::indexed_service();

    let (status, body) = send(
        router(service),
        search_request(json!({"queryText": "nike", "size": 5, "page": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["totalHits"], 2);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);
    assert!(body["facets"]["colors"].is_object());
}

#[tokio::test]
async fn test_facet_keys_keep_declared_order_on_the_wire() {
    let (_dir, service) = common::indexed_service();

    let (status, body) = send(router(service), search_request(json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    // Inspect the raw text: parsing into a map would lose key order.
    let text = String::from_utf8(body).unwrap();
    let position = |key: &str| text.find(&format!("\"{}\"", key)).unwrap();
    assert!(position("colors") < position("sizes"));
    assert!(position("sizes") < position("categories"));
    assert!(position("categories") < position("price_ranges"));
    assert!(position("0-50") < position("50-100"));
    assert!(position("100-200") < position("200+"));
}

#[tokio::test]
async fn test_filter_fields_are_accepted() {
    let (_dir, service) = common::indexed_service();

    let (status, body) = send(
        router(service),
        search_request(json!({
            "color": "black",
            "productSize": "42",
            "category": "shoes",
            "minPrice": 100.0,
            "maxPrice": 150.0
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["totalHits"], 1);
    assert_eq!(body["products"][0]["id"], "1");
}

#[tokio::test]
async fn test_invalid_size_is_bad_request() {
    let (_dir, service) = common::indexed_service();

    let (status, body) = send(router(service), search_request(json!({"size": 0}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn test_mistyped_field_is_bad_request() {
    let (_dir, service) = common::indexed_service();

    let (status, body) = send(router(service), search_request(json!({"size": "ten"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("size"));
}

#[tokio::test]
async fn test_unparseable_body_is_bad_request() {
    let (_dir, service) = common::indexed_service();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/product")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"queryText\": "))
        .unwrap();
    let (status, body) = send(router(service), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_index_is_service_unavailable() {
    let dir = TempDir::new().unwrap();
    let app = router(common::empty_service(&dir));

    let (status, body) = send(app.clone(), search_request(json!({"queryText": "nike"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "BACKEND_UNAVAILABLE");

    let (status, _) = send(app, get("/health/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_endpoints() {
    let (_dir, service) = common::indexed_service();
    let app = router(service);

    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body.get("index").is_none());

    let (status, _) = send(app.clone(), get("/health/live")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["index"], common::ALIAS);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_search_counters() {
    // Registration is process-wide; another test may have done it already.
    let _ = product_search::metrics::init_metrics();

    let (_dir, service) = common::indexed_service();
    let app = router(service);

    let (status, _) = send(app.clone(), search_request(json!({"queryText": "hoodie"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);

    let metrics = common::parse_prometheus_output(&String::from_utf8(body).unwrap());
    let requests = metrics.get("product_search_requests_total").unwrap();
    assert!(requests.iter().any(|line| line.contains("outcome=\"success\"")));
    assert!(metrics.contains_key("product_search_documents_indexed_total"));
}
