use annotator::AnnotateError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use report::ReportError;
use schema::UnknownClassError;
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can surface, mapped to an explicit status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("failed to decode uploaded image: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error(transparent)]
    UnknownClass(#[from] UnknownClassError),
    #[error("no report available")]
    NoReportAvailable,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AnnotateError> for AppError {
    fn from(err: AnnotateError) -> Self {
        match err {
            AnnotateError::UnknownClass(e) => AppError::UnknownClass(e),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::BadRequest(_) | AppError::ImageDecode(_) => {
                tracing::warn!(error = %self, "Rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
            // Expected user-facing state: no analysis has happened yet in
            // this process's lifetime.
            AppError::NoReportAvailable => (
                StatusCode::CONFLICT,
                "No report available. Please analyze an image first.",
            )
                .into_response(),
            AppError::UnknownClass(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
