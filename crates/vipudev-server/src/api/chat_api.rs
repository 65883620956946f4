//! Chat history endpoints (storage only; the assistant itself lives under
//! /api/assistant).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::{Validate, ValidationError};

use super::{error_response, validation_error, SuccessResponse};
use crate::db::ChatMessage;
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[derive(Debug, Serialize)]
pub struct MessagesEnvelope {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[validate(required(message = "role is required"), custom = "validate_role")]
    pub role: Option<String>,
    #[validate(
        required(message = "content is required"),
        length(min = 1, message = "content must not be empty")
    )]
    pub content: Option<String>,
    pub code_context: Option<String>,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    match role {
        "user" | "assistant" | "system" => Ok(()),
        _ => Err(ValidationError::new("role must be user, assistant, or system")),
    }
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<MessagesEnvelope>, Response> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    match state.db.chat.list(limit) {
        Ok(messages) => Ok(Json(MessagesEnvelope { messages })),
        Err(e) => {
            error!("Error fetching chat history: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch chat history",
            ))
        }
    }
}

pub async fn create_message(
    State(state): State<AppState>,
    Json(payload): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageEnvelope>), Response> {
    payload
        .validate()
        .map_err(|details| validation_error("Invalid message data", details))?;

    let role = payload.role.unwrap_or_default();
    let content = payload.content.unwrap_or_default();
    match state
        .db
        .chat
        .append(&role, &content, payload.code_context.as_deref())
    {
        Ok(message) => Ok((StatusCode::CREATED, Json(MessageEnvelope { message }))),
        Err(e) => {
            error!("Error creating chat message: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create message",
            ))
        }
    }
}

pub async fn clear_history(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, Response> {
    match state.db.chat.clear() {
        Ok(()) => Ok(SuccessResponse::ok()),
        Err(e) => {
            error!("Error clearing chat history: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to clear chat history",
            ))
        }
    }
}
