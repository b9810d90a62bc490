//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quotation::QuotationError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// The configured template file does not exist
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// The posted quotation data is invalid
    #[error("Invalid quotation data: {0}")]
    InvalidRequest(String),

    /// Requested download does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// The template could not be filled
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::TemplateNotFound(_)
            | Self::Generation(_)
            | Self::Io(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::TemplateNotFound(_) => "template_not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::Generation(_) => "generation_error",
            Self::Io(_) => "io_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "success": false,
            "error": {
                "message": self.to_string(),
                "type": self.type_name(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<QuotationError> for AppError {
    fn from(err: QuotationError) -> Self {
        match err {
            QuotationError::InvalidData(msg) => Self::InvalidRequest(msg),
            other => Self::Generation(other.to_string()),
        }
    }
}
