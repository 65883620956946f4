//! Project CRUD endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::Validate;

use super::{error_response, validation_error, SuccessResponse};
use crate::db::project_store::ProjectChanges;
use crate::db::{Project, ProjectFile};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProjectEnvelope {
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ProjectsEnvelope {
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub files: Vec<ProjectFile>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub files: Option<Vec<ProjectFile>>,
}

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<ProjectsEnvelope>, Response> {
    match state.db.projects.list() {
        Ok(projects) => Ok(Json(ProjectsEnvelope { projects })),
        Err(e) => {
            error!("Error fetching projects: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch projects",
            ))
        }
    }
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectEnvelope>, Response> {
    match state.db.projects.get(&id) {
        Ok(Some(project)) => Ok(Json(ProjectEnvelope { project })),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Project not found")),
        Err(e) => {
            error!("Error fetching project: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch project",
            ))
        }
    }
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectEnvelope>), Response> {
    payload
        .validate()
        .map_err(|details| validation_error("Invalid project data", details))?;

    let name = payload.name.unwrap_or_default();
    match state
        .db
        .projects
        .create(&name, payload.description.as_deref(), &payload.files)
    {
        Ok(project) => Ok((StatusCode::CREATED, Json(ProjectEnvelope { project }))),
        Err(e) => {
            error!("Error creating project: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create project",
            ))
        }
    }
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectEnvelope>, Response> {
    payload
        .validate()
        .map_err(|details| validation_error("Invalid project data", details))?;

    let changes = ProjectChanges {
        name: payload.name,
        description: payload.description,
        files: payload.files,
    };
    match state.db.projects.update(&id, changes) {
        Ok(Some(project)) => Ok(Json(ProjectEnvelope { project })),
        Ok(None) => Err(error_response(StatusCode::NOT_FOUND, "Project not found")),
        Err(e) => {
            error!("Error updating project: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update project",
            ))
        }
    }
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, Response> {
    match state.db.projects.delete(&id) {
        Ok(true) => Ok(SuccessResponse::ok()),
        Ok(false) => Err(error_response(StatusCode::NOT_FOUND, "Project not found")),
        Err(e) => {
            error!("Error deleting project: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete project",
            ))
        }
    }
}
