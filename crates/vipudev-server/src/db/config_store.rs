//! Singleton operator config.

use anyhow::Result;
use chrono::Utc;
use rusqlite::params;

use super::schema::UserConfig;
use super::{parse_timestamp, DbPool};

pub struct ConfigStore {
    pool: DbPool,
}

impl ConfigStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get(&self) -> Result<Option<UserConfig>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT backend_url, api_key, updated_at FROM user_config WHERE id = 1",
        )?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(UserConfig {
                backend_url: row.get(0)?,
                api_key: row.get(1)?,
                updated_at: parse_timestamp(&row.get::<_, String>(2)?)?,
            })),
            None => Ok(None),
        }
    }

    /// Atomic create-or-update of the single config row. Fields left unset
    /// in the request keep their stored value.
    pub fn upsert(
        &self,
        backend_url: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<UserConfig> {
        let now = Utc::now();
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO user_config (id, backend_url, api_key, updated_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                 backend_url = COALESCE(excluded.backend_url, user_config.backend_url),
                 api_key = COALESCE(excluded.api_key, user_config.api_key),
                 updated_at = excluded.updated_at",
            params![backend_url, api_key, now.to_rfc3339()],
        )?;

        // Read back: unset fields may have been preserved from the stored row.
        self.get()?
            .ok_or_else(|| anyhow::anyhow!("Config row missing after upsert"))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn get_returns_none_before_first_save() {
        let db = Database::new_in_memory().unwrap();
        assert!(db.config.get().unwrap().is_none());
    }

    #[test]
    fn upsert_creates_then_updates_in_place() {
        let db = Database::new_in_memory().unwrap();

        let first = db
            .config
            .upsert(Some("https://api.example.com"), None)
            .unwrap();
        assert_eq!(first.backend_url.as_deref(), Some("https://api.example.com"));
        assert!(first.api_key.is_none());

        let second = db.config.upsert(None, Some("sk-test")).unwrap();
        // Unset field preserved, provided field overwritten.
        assert_eq!(
            second.backend_url.as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(second.api_key.as_deref(), Some("sk-test"));

        // Still a single row.
        let conn = db.pool().get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_config", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
