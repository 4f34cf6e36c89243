//! Browser-facing upload page
//!
//! Every outcome renders the page: failures appear as a message next to the
//! form that was submitted.

pub mod page;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
};
use tracing::{debug, error};

use crate::api::state::AppState;
use crate::api::types::read_upload_request;
use crate::domain::upload::{FormKind, UploadRequest};
use crate::infrastructure::services::RequestStage;

pub use page::{render_page, PageOutcome};

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.catalog, &PageOutcome::Empty))
}

/// POST /
pub async fn upload_model(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let outcome = match read_form(multipart, FormKind::Model).await {
        Ok(request) => match state.characterization_service.characterize_model(request).await {
            Ok(result) => PageOutcome::Facts(Box::new(result)),
            Err(failure) => PageOutcome::FileError(failure.error.user_message()),
        },
        Err(message) => PageOutcome::FileError(message),
    };

    Html(render_page(&state.catalog, &outcome))
}

/// POST /upload_zip
pub async fn upload_zip(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let outcome = match read_form(multipart, FormKind::Dataset).await {
        Ok(request) => match state.characterization_service.characterize_dataset(request).await {
            Ok(dataset) => match dataset.to_json_str() {
                Ok(json) => PageOutcome::DatasetFacts {
                    json,
                    archive: dataset.label,
                },
                Err(e) => {
                    error!(stage = %RequestStage::Characterized, error = %e, "Failed to render dataset facts");
                    PageOutcome::ZipError(e.user_message())
                }
            },
            Err(failure) => PageOutcome::ZipError(failure.error.user_message()),
        },
        Err(message) => PageOutcome::ZipError(message),
    };

    Html(render_page(&state.catalog, &outcome))
}

async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    form: FormKind,
) -> Result<UploadRequest, String> {
    let multipart = multipart.map_err(|rejection| {
        debug!(error = %rejection, "Rejected upload form");
        "Please submit the form as multipart/form-data".to_string()
    })?;

    read_upload_request(multipart, form)
        .await
        .map_err(|e| e.message().to_string())
}
