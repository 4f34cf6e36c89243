//! Multipart upload form decoding

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use tracing::debug;

use crate::domain::upload::{FormKind, UploadRequest, UploadedFile};

use super::error::{ApiError, ApiErrorType};

/// Single model file
pub const FIELD_MODEL: &str = "inputFM";
/// Dataset archive
pub const FIELD_ZIP: &str = "inputZip";
/// Catalog example name
pub const FIELD_EXAMPLE: &str = "inputExample";

/// Decode the upload form fields into a request; unknown fields are ignored
pub async fn read_upload_request(
    mut multipart: Multipart,
    form: FormKind,
) -> Result<UploadRequest, ApiError> {
    let mut request = UploadRequest::new(form);

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            FIELD_MODEL | FIELD_ZIP => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                let file = UploadedFile::new(filename, bytes);

                if name == FIELD_MODEL {
                    request.model_file = Some(file);
                } else {
                    request.zip_file = Some(file);
                }
            }
            FIELD_EXAMPLE => request.example = Some(field.text().await.map_err(multipart_error)?),
            "inputName" => request.metadata.name = field.text().await.map_err(multipart_error)?,
            "inputDescription" => {
                request.metadata.description = field.text().await.map_err(multipart_error)?
            }
            "inputAuthor" => request.metadata.author = field.text().await.map_err(multipart_error)?,
            "inputReference" => {
                request.metadata.reference = field.text().await.map_err(multipart_error)?
            }
            "inputKeywords" => {
                request.metadata.keywords = field.text().await.map_err(multipart_error)?
            }
            "inputDomain" => request.metadata.domain = field.text().await.map_err(multipart_error)?,
            "inputYear" => request.metadata.year = field.text().await.map_err(multipart_error)?,
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(request)
}

fn multipart_error(error: MultipartError) -> ApiError {
    let status = error.status();
    let error_type = if status.is_server_error() {
        ApiErrorType::ServerError
    } else {
        ApiErrorType::InvalidRequestError
    };

    ApiError::new(
        status,
        error_type,
        format!("Failed to read the uploaded form: {}", error.body_text()),
    )
    .with_code("multipart_error")
}
