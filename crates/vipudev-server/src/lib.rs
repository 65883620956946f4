// VipuDev.AI/crates/vipudev-server/src/lib.rs

pub mod api;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod db;
pub mod sandbox;
pub mod server;
pub mod state;
pub mod telemetry;

// Public API exports
pub use config::Config;
pub use db::Database;
pub use server::{build_router, run_server};
pub use state::AppState;
