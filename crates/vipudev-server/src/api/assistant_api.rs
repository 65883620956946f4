//! Assistant-backed endpoints: memory-augmented chat, ZIP analysis, and
//! image generation. Each answers 500 when no provider credential is
//! configured.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::error_response;
use crate::assistant::{build_messages, AssistantClient, WireMessage};
use crate::sandbox::archive;
use crate::state::AppState;

const MISSING_KEY_MESSAGE: &str = "Assistant API key not configured on server";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantChatRequest {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    pub code_context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub analysis: String,
    pub sampled_files: usize,
}

fn assistant_or_500(state: &AppState) -> Result<Arc<AssistantClient>, Response> {
    state.assistant.clone().ok_or_else(|| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, MISSING_KEY_MESSAGE)
    })
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<AssistantChatRequest>,
) -> Result<Json<ReplyResponse>, Response> {
    let client = assistant_or_500(&state)?;

    let messages = build_messages(&state.db, req.messages, req.code_context.as_deref());
    match client.chat_completion(messages, 0.1, 4000).await {
        Ok(reply) => Ok(Json(ReplyResponse { reply })),
        Err(e) => {
            error!("assistant/chat error: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate assistant reply",
            ))
        }
    }
}

pub async fn analyze_zip(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, Response> {
    let client = assistant_or_500(&state)?;

    let mut upload: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Malformed multipart upload: {}", e);
        error_response(StatusCode::BAD_REQUEST, "Malformed upload")
    })? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await.map_err(|e| {
                error!("Failed to read upload: {}", e);
                error_response(StatusCode::BAD_REQUEST, "Malformed upload")
            })?);
            break;
        }
    }
    let data = upload
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "ZIP file is required"))?;

    let (combined, sampled_files) = archive::sample_archive(&data).map_err(|e| {
        error!("Analyze ZIP error: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to analyze ZIP")
    })?;
    info!("Sampled {} files from uploaded ZIP", sampled_files);

    let combined = if combined.is_empty() {
        "(no readable text files found)".to_string()
    } else {
        combined
    };
    let incoming = vec![
        WireMessage::new(
            "user",
            "I uploaded a ZIP project. Analyze its structure, tech stack, potential issues, and suggest improvements.",
        ),
        WireMessage::new("user", combined),
    ];
    let messages = build_messages(&state.db, incoming, None);

    match client.chat_completion(messages, 0.2, 4000).await {
        Ok(analysis) => Ok(Json(AnalysisResponse {
            analysis,
            sampled_files,
        })),
        Err(e) => {
            error!("Analyze ZIP error: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to analyze ZIP",
            ))
        }
    }
}

pub async fn generate_image(
    State(state): State<AppState>,
    Json(req): Json<GenerateImageRequest>,
) -> Result<Json<UrlResponse>, Response> {
    let client = assistant_or_500(&state)?;

    let prompt = match req.prompt.as_deref() {
        Some(prompt) if !prompt.is_empty() => prompt,
        _ => return Err(error_response(StatusCode::BAD_REQUEST, "prompt is required")),
    };

    match client.generate_image(prompt).await {
        Ok(url) => Ok(Json(UrlResponse { url })),
        Err(e) => {
            error!("Image generation error: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Image generation failed",
            ))
        }
    }
}
