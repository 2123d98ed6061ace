use crate::error::ApiError;
use crate::models::DiagnosisReport;
use crate::startup::AppState;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    response::IntoResponse,
    Json,
};

/// `POST /analyze`: read the `image` multipart field, forward the bytes to
/// the diagnosis provider, and parse the model's JSON reply into the
/// response shape.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // A non-multipart body is the same caller mistake as a missing field.
    let mut multipart = multipart.map_err(|_| ApiError::MissingImage)?;

    let mut image = None;
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            ApiError::UploadUnreadable(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })?;
        let Some(field) = field else { break };

        if field.name() == Some("image") {
            let bytes = field.bytes().await.map_err(|e| {
                ApiError::UploadReadFailed(anyhow::anyhow!("Failed to read image bytes: {}", e))
            })?;
            image = Some(bytes);
            break;
        }
    }

    let image = image.ok_or(ApiError::MissingImage)?;
    if image.is_empty() {
        return Err(ApiError::UploadReadFailed(anyhow::anyhow!(
            "Uploaded image was empty"
        )));
    }

    tracing::info!(image_bytes = image.len(), "Image received for analysis");

    let raw = state.provider.diagnose(&image).await?;
    let report: DiagnosisReport = serde_json::from_str(&raw)?;

    Ok(Json(report))
}
