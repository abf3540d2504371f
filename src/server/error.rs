//! HTTP error mapping.

use crate::error::VoxError;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Error returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Multipart body could not be read (400, or 413 when too large)
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Service(#[from] VoxError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Multipart(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
            }
            ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Service(err) => match err {
                VoxError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                VoxError::ModelNotLoaded { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "MODEL_NOT_LOADED")
                }
                VoxError::NoBackendAvailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "NO_BACKEND_AVAILABLE")
                }
                VoxError::TranslatorUnavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "TRANSLATOR_UNAVAILABLE")
                }
                VoxError::AnalysisFailure { .. } | VoxError::ModelLoad { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "ANALYSIS_FAILED")
                }
                VoxError::TranslationFailure { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "TRANSLATION_FAILED")
                }
                VoxError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
                VoxError::ConfigFileNotFound { .. }
                | VoxError::ConfigInvalidValue { .. }
                | VoxError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = match &self {
            ApiError::Service(err) => err.to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, %message, "Request failed");
        } else {
            tracing::debug!(code = error_code, %message, "Request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
