//! Error types for the review server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use precedent_search::SearchError;
use review_engine::ReviewError;
use serde::Serialize;
use shared_pdf::ExtractionError;
use thiserror::Error;
use tokio::task::JoinError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unprocessable input: {0}")]
    Unprocessable(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::TemplateNotFound(name) => (
                StatusCode::NOT_FOUND,
                "TEMPLATE_NOT_FOUND",
                format!("Template '{}' not found", name),
            ),
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_INPUT",
                msg.clone(),
            ),
            ServerError::Extraction(err) => {
                let code = match err {
                    ExtractionError::PasswordProtected => "PASSWORD_PROTECTED",
                    ExtractionError::Empty(_) => "EMPTY_DOCUMENT",
                    ExtractionError::InvalidPdf(_) | ExtractionError::Extraction(_) => {
                        "EXTRACTION_FAILED"
                    }
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, err.to_string())
            }
            ServerError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ReviewError> for ServerError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::TemplateNotFound(name) => ServerError::TemplateNotFound(name),
            other => ServerError::Unprocessable(other.to_string()),
        }
    }
}

impl From<SearchError> for ServerError {
    fn from(err: SearchError) -> Self {
        ServerError::InvalidRequest(err.to_string())
    }
}

impl From<JoinError> for ServerError {
    fn from(err: JoinError) -> Self {
        ServerError::Internal(format!("Review task panicked: {}", err))
    }
}
