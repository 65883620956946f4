//! Singleton operator-config endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::error_response;
use crate::db::UserConfig;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ConfigEnvelope {
    /// Null until the first save.
    pub config: Option<UserConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
}

pub async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<ConfigEnvelope>, Response> {
    match state.db.config.get() {
        Ok(config) => Ok(Json(ConfigEnvelope { config })),
        Err(e) => {
            error!("Error fetching config: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch config",
            ))
        }
    }
}

pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<UpdateConfigRequest>,
) -> Result<Json<ConfigEnvelope>, Response> {
    match state
        .db
        .config
        .upsert(payload.backend_url.as_deref(), payload.api_key.as_deref())
    {
        Ok(config) => Ok(Json(ConfigEnvelope {
            config: Some(config),
        })),
        Err(e) => {
            error!("Error updating config: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update config",
            ))
        }
    }
}
