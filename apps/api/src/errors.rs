use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::error::{ErrorKind, GenerationError};
use crate::session::view_model::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Busy | SessionError::NothingToRegenerate => {
                AppError::Conflict(err.to_string())
            }
            SessionError::UnknownParam(_) => AppError::Validation(err.to_string()),
            SessionError::EmptyInput { field } => {
                AppError::Generation(GenerationError::EmptyInput { field })
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Generation(e) => {
                let (status, code) = match e.kind() {
                    ErrorKind::UnknownTask => (StatusCode::NOT_FOUND, "UNKNOWN_TASK"),
                    ErrorKind::EmptyInput => (StatusCode::BAD_REQUEST, "EMPTY_INPUT"),
                    ErrorKind::Transport => (StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE"),
                    ErrorKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, "PROVIDER_TIMEOUT"),
                    ErrorKind::Malformed => (StatusCode::BAD_GATEWAY, "MALFORMED_COMPLETION"),
                };
                if status.is_server_error() {
                    tracing::error!("Generation error: {e}");
                }
                (status, code, e.user_message())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
