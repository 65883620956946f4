//! Record store - SQLite-backed persistence for projects, chat history,
//! execution logs, operator config, and bearer-token sessions.

pub mod chat_store;
pub mod config_store;
pub mod execution_store;
pub mod project_store;
pub mod schema;

pub use chat_store::ChatStore;
pub use config_store::ConfigStore;
pub use execution_store::ExecutionStore;
pub use project_store::ProjectStore;
pub use schema::*;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

pub type DbPool = Arc<Pool<SqliteConnectionManager>>;

pub struct Database {
    pub projects: ProjectStore,
    pub chat: ChatStore,
    pub executions: ExecutionStore,
    pub config: ConfigStore,
    pool: DbPool,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self> {
        info!("Opening database at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        );
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create connection pool: {}", e))?;

        {
            let conn = pool.get()?;
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            conn.execute_batch(schema::SCHEMA_SQL)?;
        }

        let pool = Arc::new(pool);
        info!("Database initialized");
        Ok(Self::from_pool(pool))
    }

    /// In-memory database for tests. A named shared-cache URI is used so
    /// every pooled connection sees the same database; plain `:memory:`
    /// would give each connection a private one.
    pub fn new_in_memory() -> Result<Self> {
        let uri = format!(
            "file:vipudev-{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        );
        let manager = SqliteConnectionManager::file(uri).with_flags(
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        );
        let pool = Pool::builder().max_size(5).build(manager)?;
        {
            let conn = pool.get()?;
            conn.execute_batch(schema::SCHEMA_SQL)?;
        }
        Ok(Self::from_pool(Arc::new(pool)))
    }

    fn from_pool(pool: DbPool) -> Self {
        Self {
            projects: ProjectStore::new(Arc::clone(&pool)),
            chat: ChatStore::new(Arc::clone(&pool)),
            executions: ExecutionStore::new(Arc::clone(&pool)),
            config: ConfigStore::new(Arc::clone(&pool)),
            pool,
        }
    }

    /// Shared handle to the underlying pool, for stores that live outside
    /// this module (the session store).
    pub fn pool(&self) -> DbPool {
        Arc::clone(&self.pool)
    }
}

/// Timestamps are stored as RFC 3339 text.
pub(crate) fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Failed to parse timestamp {:?}: {}", raw, e))
}
