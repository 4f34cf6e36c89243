//! JSON API endpoints

pub mod characterize;
pub mod examples;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create the JSON API router
pub fn create_rest_router() -> Router<AppState> {
    Router::new()
        .route("/characterize", post(characterize::characterize_model))
        .route("/characterize/dataset", post(characterize::characterize_dataset))
        .route("/examples", get(examples::list_examples))
}
