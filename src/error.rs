use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Request-level errors for the HTTP boundary.
///
/// Wire bodies carry fixed user-facing messages; the internal cause is
/// logged but never leaked to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no image file in multipart payload")]
    MissingImage,

    #[error("failed to process uploaded file: {0}")]
    UploadUnreadable(anyhow::Error),

    #[error("failed to read file content: {0}")]
    UploadReadFailed(anyhow::Error),

    #[error("diagnosis provider error: {0}")]
    Diagnosis(#[from] ProviderError),

    #[error("model returned malformed diagnosis payload: {0}")]
    MalformedModelOutput(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, message) = match &self {
            ApiError::MissingImage => (
                StatusCode::BAD_REQUEST,
                "No image file provided or invalid format",
            ),
            ApiError::UploadUnreadable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process uploaded file",
            ),
            ApiError::UploadReadFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read file content",
            ),
            ApiError::Diagnosis(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get diagnosis from AI",
            ),
            ApiError::MalformedModelOutput(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process AI response",
            ),
        };

        if status.is_server_error() {
            tracing::error!(cause = %self, "Request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
