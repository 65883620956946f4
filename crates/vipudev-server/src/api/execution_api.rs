//! Execution-log endpoints. Records are appended by the client after a run;
//! the runs themselves happen under /api/run and /api/run-project.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::Validate;

use super::{error_response, validation_error};
use crate::db::CodeExecution;
use crate::state::AppState;

const DEFAULT_EXECUTION_LIMIT: i64 = 20;

#[derive(Debug, Serialize)]
pub struct ExecutionsEnvelope {
    pub executions: Vec<CodeExecution>,
}

#[derive(Debug, Serialize)]
pub struct ExecutionEnvelope {
    pub execution: CodeExecution,
}

#[derive(Debug, Deserialize)]
pub struct ExecutionsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExecutionRequest {
    #[validate(
        required(message = "language is required"),
        length(min = 1, message = "language must not be empty")
    )]
    pub language: Option<String>,
    #[validate(required(message = "code is required"))]
    pub code: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i64>,
}

pub async fn list_executions(
    State(state): State<AppState>,
    Query(query): Query<ExecutionsQuery>,
) -> Result<Json<ExecutionsEnvelope>, Response> {
    let limit = query.limit.unwrap_or(DEFAULT_EXECUTION_LIMIT);
    match state.db.executions.list(limit) {
        Ok(executions) => Ok(Json(ExecutionsEnvelope { executions })),
        Err(e) => {
            error!("Error fetching executions: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch executions",
            ))
        }
    }
}

pub async fn create_execution(
    State(state): State<AppState>,
    Json(payload): Json<CreateExecutionRequest>,
) -> Result<(StatusCode, Json<ExecutionEnvelope>), Response> {
    payload
        .validate()
        .map_err(|details| validation_error("Invalid execution data", details))?;

    let language = payload.language.unwrap_or_default();
    let code = payload.code.unwrap_or_default();
    match state.db.executions.append(
        &language,
        &code,
        payload.stdout.as_deref(),
        payload.stderr.as_deref(),
        payload.exit_code,
    ) {
        Ok(execution) => Ok((StatusCode::CREATED, Json(ExecutionEnvelope { execution }))),
        Err(e) => {
            error!("Error creating execution: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create execution",
            ))
        }
    }
}
