//! API request and response types

pub mod error;
pub mod upload;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use upload::read_upload_request;
