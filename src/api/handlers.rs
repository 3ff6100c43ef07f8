use crate::api::AppState;
use crate::error::Result;
use crate::metrics::gather_metrics;
use crate::models::{SearchRequest, SearchResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        index: None,
    }))
}

/// Readiness: the configured index must resolve and open
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    state.search.check_ready().await?;

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        index: Some(state.search.index_name().to_string()),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

/// Prometheus exposition
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Run a product search
pub async fn search_products(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>> {
    let Json(request) = payload?;
    let span = tracing::info_span!("search", request_id = %Uuid::new_v4());
    let response = state.search.search(request).instrument(span).await?;
    Ok(Json(response))
}
