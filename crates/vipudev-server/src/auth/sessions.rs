//! Bearer-token session store, backed by the record store with explicit
//! expiry. Sessions survive restarts; expired rows are deleted lazily.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::RngCore;
use rusqlite::params;
use tracing::debug;

use crate::db::DbPool;

pub struct SessionStore {
    pool: DbPool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: DbPool, ttl_seconds: i64) -> Self {
        Self {
            pool,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Create a session and return its opaque token (64 hex chars).
    pub fn issue(&self) -> Result<String> {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO auth_sessions (token, created_at, expires_at)
             VALUES (?1, ?2, ?3)",
            params![&token, now.to_rfc3339(), expires_at.to_rfc3339()],
        )?;

        debug!("Issued session expiring at {}", expires_at);
        Ok(token)
    }

    /// True for a known, unexpired token. Expired tokens are removed as a
    /// side effect.
    pub fn validate(&self, token: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT expires_at FROM auth_sessions WHERE token = ?1")?;
        let mut rows = stmt.query([token])?;

        let expires_at: String = match rows.next()? {
            Some(row) => row.get(0)?,
            None => return Ok(false),
        };
        drop(rows);
        drop(stmt);

        if crate::db::parse_timestamp(&expires_at)? <= Utc::now() {
            conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
            debug!("Rejected expired session token");
            return Ok(false);
        }
        Ok(true)
    }

    /// Revoking an unknown token is a no-op.
    pub fn revoke(&self, token: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
        Ok(())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut token = String::with_capacity(64);
    for byte in bytes {
        let _ = write!(token, "{:02x}", byte);
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn store(ttl_seconds: i64) -> (Database, SessionStore) {
        let db = Database::new_in_memory().unwrap();
        let sessions = SessionStore::new(db.pool(), ttl_seconds);
        (db, sessions)
    }

    #[test]
    fn issued_token_validates_until_revoked() {
        let (_db, sessions) = store(3600);
        let token = sessions.issue().unwrap();
        assert_eq!(token.len(), 64);
        assert!(sessions.validate(&token).unwrap());

        sessions.revoke(&token).unwrap();
        assert!(!sessions.validate(&token).unwrap());
    }

    #[test]
    fn unknown_token_is_rejected() {
        let (_db, sessions) = store(3600);
        assert!(!sessions.validate("not-a-token").unwrap());
    }

    #[test]
    fn expired_token_is_rejected_and_removed() {
        let (db, sessions) = store(-1);
        let token = sessions.issue().unwrap();
        assert!(!sessions.validate(&token).unwrap());

        let conn = db.pool().get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM auth_sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn tokens_are_unique() {
        let (_db, sessions) = store(3600);
        let a = sessions.issue().unwrap();
        let b = sessions.issue().unwrap();
        assert_ne!(a, b);
    }
}
