//! Login, token verification, and logout.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::error_response;
use crate::auth::bearer_token;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Response> {
    if !state.credentials.verify(&req.username, &req.password) {
        return Err(error_response(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    match state.sessions.issue() {
        Ok(token) => {
            info!("Operator logged in");
            Ok(Json(LoginResponse {
                token,
                message: "Login successful".to_string(),
            }))
        }
        Err(e) => {
            error!("Failed to issue session: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to issue session",
            ))
        }
    }
}

/// Sits behind the auth middleware, so reaching the handler means the
/// token was valid.
pub async fn verify() -> Json<VerifyResponse> {
    Json(VerifyResponse { valid: true })
}

/// Always 200; revoking an unknown token is a no-op.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<MessageResponse> {
    if let Some(token) = bearer_token(&headers) {
        if let Err(e) = state.sessions.revoke(token) {
            error!("Failed to revoke session: {}", e);
        }
    }
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}
