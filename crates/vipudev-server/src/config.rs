// VipuDev.AI/crates/vipudev-server/src/config.rs

use anyhow::{Context, Result};
use std::env;
use tracing::{info, warn};

/// Server configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub database_path: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Credential for the hosted assistant/image provider. Routes that need
    /// it answer 500 when it is absent.
    pub assistant_api_key: Option<String>,
    pub assistant_base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub session_ttl_seconds: i64,
    pub run_timeout_seconds: u64,
    pub sandbox_timeout_seconds: u64,
    pub sandbox_memory_limit: String,
    pub sandbox_cpu_limit: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let assistant_api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        if assistant_api_key.is_none() {
            warn!("OPENAI_API_KEY not set; assistant and image routes will be unavailable");
        }

        Ok(Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8000".into())
                .parse()
                .context("API_PORT must be a port number")?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/vipudev.db".into()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into()),
            assistant_api_key,
            assistant_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            image_model: env::var("IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".into()),
            session_ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .unwrap_or_else(|_| "86400".into())
                .parse()
                .context("SESSION_TTL_SECONDS must be an integer")?,
            run_timeout_seconds: env::var("RUN_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "7".into())
                .parse()?,
            sandbox_timeout_seconds: env::var("SANDBOX_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "20".into())
                .parse()?,
            sandbox_memory_limit: env::var("SANDBOX_MEMORY_LIMIT")
                .unwrap_or_else(|_| "512m".into()),
            sandbox_cpu_limit: env::var("SANDBOX_CPU_LIMIT").unwrap_or_else(|_| "1".into()),
        })
    }

    /// Log a startup summary. Secrets are reported by presence only.
    pub fn print_config(&self) {
        info!("API listening address: {}:{}", self.api_host, self.api_port);
        info!("Database path: {}", self.database_path);
        info!(
            "Assistant backend: {} (key {})",
            self.assistant_base_url,
            if self.assistant_api_key.is_some() {
                "configured"
            } else {
                "missing"
            }
        );
        info!(
            "Sandbox limits: {} memory, {} cpus, {}s timeout",
            self.sandbox_memory_limit, self.sandbox_cpu_limit, self.sandbox_timeout_seconds
        );
        info!("Session TTL: {}s", self.session_ttl_seconds);
    }
}
