//! Mapping of core errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scdash_core::{CoreError, ExportError};
use tracing::{error, warn};

/// Error returned by API handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            CoreError::Export(ExportError::Unsupported { .. }) => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_user_error() {
            warn!(error = %self.0, status = status.as_u16(), "Rejected request");
        } else {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}
