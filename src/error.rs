//! Error types for the EPUB to PDF server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::convert::{ConversionError, ValidationError};

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to read upload: {0}")]
    Upload(String),

    #[error(transparent)]
    Conversion(ConversionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Validation(e) => AppError::Validation(e),
            other => AppError::Conversion(other),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(e) => {
                tracing::warn!("Rejected upload: {}", e);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string()))
            }
            AppError::Upload(msg) => {
                tracing::warn!("Failed to read upload: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Failed to read upload", msg.clone()),
                )
            }
            AppError::Conversion(ConversionError::NoContent) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(ConversionError::NoContent.to_string()),
            ),
            AppError::Conversion(e) => {
                tracing::error!("Conversion failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Exception", e.to_string()),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Exception", msg.clone()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
