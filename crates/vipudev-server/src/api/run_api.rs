//! Code-execution endpoints: host snippets, container projects, and the
//! single-file ZIP download.

use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use super::error_response;
use crate::sandbox::{self, archive, ContainerOutcome, SnippetOutcome, SubmittedFile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub code: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunProjectRequest {
    pub files: Option<Vec<SubmittedFile>>,
    pub language: Option<String>,
    pub command: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ZipCodeRequest {
    pub code: Option<String>,
    pub language: Option<String>,
    pub filename: Option<String>,
}

pub async fn run_snippet(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Result<Json<SnippetOutcome>, Response> {
    let code = match req.code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => return Err(error_response(StatusCode::BAD_REQUEST, "Code is required")),
    };

    let limit = Duration::from_secs(state.config.run_timeout_seconds);
    match sandbox::host::run_snippet(code, req.language.as_deref(), limit).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            error!("run error: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Execution failed on backend",
            ))
        }
    }
}

pub async fn run_project(
    State(state): State<AppState>,
    Json(req): Json<RunProjectRequest>,
) -> Result<Json<ContainerOutcome>, Response> {
    let files = match req.files {
        Some(files) if !files.is_empty() => files,
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "files array is required",
            ))
        }
    };

    // Path problems are the caller's fault; report them before staging.
    for file in &files {
        if let Err(e) = sandbox::sanitize_rel_path(&file.path) {
            return Err(error_response(StatusCode::BAD_REQUEST, &e.to_string()));
        }
    }

    let language = req.language.as_deref().unwrap_or("node");
    match state
        .sandbox
        .run(&files, language, req.command.as_deref())
        .await
    {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            error!("run-project error: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to run project in Docker. Ensure Docker is installed and accessible.",
            ))
        }
    }
}

pub async fn zip_code(Json(req): Json<ZipCodeRequest>) -> Result<Response, Response> {
    let code = match req.code.as_deref() {
        Some(code) if !code.is_empty() => code,
        _ => return Err(error_response(StatusCode::BAD_REQUEST, "Code is required")),
    };

    match archive::bundle_single_file(code, req.language.as_deref(), req.filename.as_deref()) {
        Ok(bytes) => Ok((
            [
                (header::CONTENT_TYPE, "application/zip"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"vipudevai-project.zip\"",
                ),
            ],
            bytes,
        )
            .into_response()),
        Err(e) => {
            error!("ZIP creation error: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create ZIP",
            ))
        }
    }
}
