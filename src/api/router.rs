use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::rest;
use super::state::AppState;
use super::web;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state.
///
/// Request bodies above `max_upload_bytes` are rejected before any upload
/// reaches scratch storage.
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // Upload page
        .route("/", get(web::index).post(web::upload_model))
        .route("/upload_zip", post(web::upload_zip))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // JSON API
        .nest("/api", rest::create_rest_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Expose Prometheus metrics at `path` next to `router`
pub fn with_metrics(router: Router, metrics: PrometheusMetrics, path: &str) -> Router {
    router.merge(create_metrics_router(metrics, path))
}
