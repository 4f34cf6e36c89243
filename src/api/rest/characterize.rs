//! Characterization endpoint handlers

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{read_upload_request, ApiError};
use crate::domain::characterization::CharacterizationResult;
use crate::domain::upload::FormKind;

/// POST /api/characterize
pub async fn characterize_model(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CharacterizationResult>, ApiError> {
    let request = read_upload_request(multipart?, FormKind::Model).await?;
    debug!(example = ?request.example, "Characterizing model via API");

    let result = state
        .characterization_service
        .characterize_model(request)
        .await?;

    Ok(Json(result))
}

/// POST /api/characterize/dataset
pub async fn characterize_dataset(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request = read_upload_request(multipart?, FormKind::Dataset).await?;
    debug!("Characterizing dataset via API");

    let dataset = state
        .characterization_service
        .characterize_dataset(request)
        .await?;

    Ok(Json(dataset.to_json()))
}
