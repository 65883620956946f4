//! Server startup and router assembly. All API handlers reach their
//! dependencies through [`AppState`]; the only network calls out of process
//! are to the assistant provider and the container runtime.

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::api;
use crate::auth;
use crate::config::Config;
use crate::state::AppState;

/// Uploads (ZIP analysis) can be larger than the axum default.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub async fn run_server(cfg: Config) -> Result<()> {
    crate::telemetry::init_tracing();
    cfg.print_config();

    let state = AppState::from_config(cfg.clone())?;

    info!("Starting HTTP server on {}:{}", cfg.api_host, cfg.api_port);
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", cfg.api_host, cfg.api_port)).await?;

    let app = build_router(state);

    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    use tower_http::{
        cors::{Any, CorsLayer},
        timeout::TimeoutLayer,
        trace::TraceLayer,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    // Everything except login/logout sits behind the bearer-token check.
    let protected = Router::new()
        .route("/api/auth/verify", get(api::auth_api::verify))
        .route(
            "/api/projects",
            get(api::project_api::list_projects).post(api::project_api::create_project),
        )
        .route(
            "/api/projects/:id",
            get(api::project_api::get_project)
                .patch(api::project_api::update_project)
                .delete(api::project_api::delete_project),
        )
        .route(
            "/api/chat/history",
            get(api::chat_api::get_history).delete(api::chat_api::clear_history),
        )
        .route("/api/chat", post(api::chat_api::create_message))
        .route(
            "/api/executions",
            get(api::execution_api::list_executions).post(api::execution_api::create_execution),
        )
        .route(
            "/api/config",
            get(api::config_api::get_config).post(api::config_api::update_config),
        )
        .route("/api/assistant/chat", post(api::assistant_api::chat))
        .route("/api/run", post(api::run_api::run_snippet))
        .route("/api/run-project", post(api::run_api::run_project))
        .route("/api/zip-code", post(api::run_api::zip_code))
        .route("/api/analyze-zip", post(api::assistant_api::analyze_zip))
        .route(
            "/api/generate-image",
            post(api::assistant_api::generate_image),
        )
        .route("/api/deploy", post(api::deploy_api::deploy))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api/auth/login", post(api::auth_api::login))
        .route("/api/auth/logout", post(api::auth_api::logout))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(600)))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
