//! Example catalog endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::domain::catalog::ExampleModel;

#[derive(Debug, Serialize)]
pub struct ExamplesResponse {
    pub examples: Vec<ExampleModel>,
}

/// GET /api/examples
pub async fn list_examples(State(state): State<AppState>) -> Json<ExamplesResponse> {
    Json(ExamplesResponse {
        examples: state.catalog.iter().cloned().collect(),
    })
}
