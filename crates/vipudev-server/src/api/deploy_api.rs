//! Deployment guidance. Returns static per-platform instructions; nothing
//! is actually deployed.

use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub success: bool,
    pub logs: String,
}

const VERCEL_STEPS: &str = "
To deploy to Vercel:
1) Install CLI: npm i -g vercel
2) Run from the dashboard's client directory: vercel && vercel --prod
3) Point the client at this server's URL and set environment vars (OPENAI_API_KEY, DATABASE_PATH, etc.).
";

const RENDER_STEPS: &str = "
To deploy to Render:
1) Push this repo to GitHub.
2) Create a new Web Service in Render and connect the repo.
3) Build command: cargo build --release
4) Start command: ./target/release/vipudev-server
5) Configure environment variables (ADMIN_USERNAME, ADMIN_PASSWORD, OPENAI_API_KEY, DATABASE_PATH).
";

const RAILWAY_STEPS: &str = "
To deploy to Railway:
1) Install Railway CLI: npm i -g @railway/cli
2) railway login
3) railway init
4) railway up
5) Add your environment variables in the Railway dashboard.
";

pub async fn deploy(Json(req): Json<DeployRequest>) -> Result<Json<DeployResponse>, Response> {
    let platform = match req.platform.as_deref() {
        Some(platform) if !platform.is_empty() => platform.to_lowercase(),
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "platform is required",
            ))
        }
    };

    let logs = match platform.as_str() {
        "vercel" => VERCEL_STEPS,
        "render" => RENDER_STEPS,
        "railway" => RAILWAY_STEPS,
        _ => "Unknown platform. Use vercel | render | railway.",
    };

    Ok(Json(DeployResponse {
        success: true,
        logs: logs.to_string(),
    }))
}
