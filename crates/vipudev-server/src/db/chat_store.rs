//! Append-only chat history.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};
use tracing::debug;

use super::schema::ChatMessage;
use super::{parse_timestamp, DbPool};

pub struct ChatStore {
    pool: DbPool,
}

impl ChatStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn append(
        &self,
        role: &str,
        content: &str,
        code_context: Option<&str>,
    ) -> Result<ChatMessage> {
        let now = Utc::now();
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO chat_messages (role, content, code_context, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![role, content, code_context, now.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();

        Ok(ChatMessage {
            id,
            role: role.to_string(),
            content: content.to_string(),
            code_context: code_context.map(str::to_string),
            created_at: now,
        })
    }

    /// Oldest first, up to `limit` rows.
    pub fn list(&self, limit: i64) -> Result<Vec<ChatMessage>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, role, content, code_context, created_at
             FROM chat_messages ORDER BY id ASC LIMIT ?1",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(row_to_message(row)?);
        }
        Ok(messages)
    }

    /// The newest `limit` messages, returned in chronological order. Used
    /// for the assistant's memory window.
    pub fn recent(&self, limit: i64) -> Result<Vec<ChatMessage>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, role, content, code_context, created_at
             FROM chat_messages ORDER BY id DESC LIMIT ?1",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(row_to_message(row)?);
        }
        messages.reverse();
        Ok(messages)
    }

    pub fn clear(&self) -> Result<()> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM chat_messages", [])?;
        debug!("Cleared chat history ({} messages)", removed);
        Ok(())
    }
}

fn row_to_message(row: &Row<'_>) -> Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get(0)?,
        role: row.get(1)?,
        content: row.get(2)?,
        code_context: row.get(3)?,
        created_at: parse_timestamp(&row.get::<_, String>(4)?)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn list_returns_oldest_first_with_limit() {
        let db = Database::new_in_memory().unwrap();
        for i in 0..5 {
            db.chat
                .append("user", &format!("message {}", i), None)
                .unwrap();
        }

        let messages = db.chat.list(3).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "message 0");
        assert_eq!(messages[2].content, "message 2");
    }

    #[test]
    fn recent_returns_newest_window_in_chronological_order() {
        let db = Database::new_in_memory().unwrap();
        for i in 0..5 {
            db.chat
                .append("user", &format!("message {}", i), None)
                .unwrap();
        }

        let messages = db.chat.recent(2).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "message 3");
        assert_eq!(messages[1].content, "message 4");
    }

    #[test]
    fn clear_empties_history() {
        let db = Database::new_in_memory().unwrap();
        db.chat.append("user", "hello", Some("let x = 1")).unwrap();
        db.chat.clear().unwrap();
        assert!(db.chat.list(50).unwrap().is_empty());
    }
}
