//! Application state shared by all route handlers. Everything hangs off
//! `Arc`s; the router clones the state freely.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::assistant::AssistantClient;
use crate::auth::{CredentialVerifier, SessionStore, StaticCredentials};
use crate::config::Config;
use crate::db::Database;
use crate::sandbox::ContainerRunner;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<SessionStore>,
    pub credentials: Arc<dyn CredentialVerifier>,
    /// `None` when no provider credential is configured; the affected
    /// routes answer 500.
    pub assistant: Option<Arc<AssistantClient>>,
    pub sandbox: Arc<ContainerRunner>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the database at the configured path and wire up the rest.
    pub fn from_config(cfg: Config) -> Result<Self> {
        let db = Database::new(Path::new(&cfg.database_path))?;
        Ok(Self::assemble(cfg, db))
    }

    /// Build state over an existing database; used by tests with the
    /// in-memory store.
    pub fn with_database(cfg: Config, db: Database) -> Self {
        Self::assemble(cfg, db)
    }

    fn assemble(cfg: Config, db: Database) -> Self {
        let sessions = Arc::new(SessionStore::new(db.pool(), cfg.session_ttl_seconds));
        let credentials: Arc<dyn CredentialVerifier> =
            Arc::new(StaticCredentials::from_config(&cfg));
        let assistant = cfg.assistant_api_key.as_ref().map(|key| {
            Arc::new(AssistantClient::new(
                cfg.assistant_base_url.clone(),
                key.clone(),
                cfg.chat_model.clone(),
                cfg.image_model.clone(),
            ))
        });
        let sandbox = Arc::new(ContainerRunner::from_config(&cfg));

        Self {
            db: Arc::new(db),
            sessions,
            credentials,
            assistant,
            sandbox,
            config: Arc::new(cfg),
        }
    }
}
