//! Request-boundary error type. Everything a handler can fail with is
//! converted to a JSON `{"error": ...}` body here; nothing crashes the
//! process and no internal error object crosses the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chart::RenderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No code provided")]
    MissingCode,

    #[error("Invalid request data")]
    InvalidRequest,

    #[error("Plot generation failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied")]
    AccessDenied,

    #[error("Server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingCode | AppError::InvalidRequest | AppError::Render(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized | AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
