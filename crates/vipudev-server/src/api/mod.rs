//! API module - route handlers and shared response envelopes.

pub mod assistant_api;
pub mod auth_api;
pub mod chat_api;
pub mod config_api;
pub mod deploy_api;
pub mod execution_api;
pub mod project_api;
pub mod run_api;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use validator::ValidationErrors;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

#[derive(Debug, Serialize)]
struct ValidationFailure {
    error: String,
    details: ValidationErrors,
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// 400 with per-field validation details.
pub(crate) fn validation_error(message: &str, details: ValidationErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ValidationFailure {
            error: message.to_string(),
            details,
        }),
    )
        .into_response()
}
