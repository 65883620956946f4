//! Bearer-token middleware for the protected API routes.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tracing::error;

use crate::api::error_response;
use crate::state::AppState;

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Rejects requests without a valid session token. Any valid token has full
/// access; there is no per-token identity or scope.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let valid = match bearer_token(request.headers()) {
        Some(token) => match state.sessions.validate(token) {
            Ok(valid) => valid,
            Err(e) => {
                error!("Session lookup failed: {}", e);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to verify token",
                );
            }
        },
        None => false,
    };

    if !valid {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    next.run(request).await
}
