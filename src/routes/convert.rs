//! EPUB upload and conversion endpoint

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
};

use crate::error::{AppError, Result};
use crate::state::AppState;

const OUTPUT_FILENAME: &str = "converted.pdf";

/// Convert an uploaded EPUB to PDF
///
/// Expects the book in a multipart field named `file`.
pub async fn convert_epub(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    tracing::debug!("Starting conversion request");

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::Upload(e.to_string())
    })? {
        let name = field.name().unwrap_or("").to_string();
        let filename = field.file_name().map(|s| s.to_string());

        tracing::debug!("Received field: name='{}', filename={:?}", name, filename);

        if name != "file" {
            continue;
        }

        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            AppError::Upload(e.to_string())
        })?;

        let output = state
            .converter()
            .convert_upload(filename.as_deref(), &data)
            .await?;

        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/pdf")
            .header(header::CONTENT_LENGTH, output.pdf.len())
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
            )
            .body(Body::from(output.pdf))
            .map_err(|e| AppError::Internal(e.to_string()));
    }

    tracing::warn!("No file field found in multipart upload");
    Err(crate::convert::ValidationError::MissingFile.into())
}
