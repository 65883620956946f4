//! Append-only code-execution log.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};

use super::schema::CodeExecution;
use super::{parse_timestamp, DbPool};

pub struct ExecutionStore {
    pool: DbPool,
}

impl ExecutionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn append(
        &self,
        language: &str,
        code: &str,
        stdout: Option<&str>,
        stderr: Option<&str>,
        exit_code: Option<i64>,
    ) -> Result<CodeExecution> {
        let now = Utc::now();
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO code_executions (language, code, stdout, stderr, exit_code, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![language, code, stdout, stderr, exit_code, now.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();

        Ok(CodeExecution {
            id,
            language: language.to_string(),
            code: code.to_string(),
            stdout: stdout.map(str::to_string),
            stderr: stderr.map(str::to_string),
            exit_code,
            created_at: now,
        })
    }

    /// Newest first, up to `limit` rows.
    pub fn list(&self, limit: i64) -> Result<Vec<CodeExecution>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, language, code, stdout, stderr, exit_code, created_at
             FROM code_executions ORDER BY id DESC LIMIT ?1",
        )?;
        let mut rows = stmt.query([limit])?;
        let mut executions = Vec::new();
        while let Some(row) = rows.next()? {
            executions.push(row_to_execution(row)?);
        }
        Ok(executions)
    }
}

fn row_to_execution(row: &Row<'_>) -> Result<CodeExecution> {
    Ok(CodeExecution {
        id: row.get(0)?,
        language: row.get(1)?,
        code: row.get(2)?,
        stdout: row.get(3)?,
        stderr: row.get(4)?,
        exit_code: row.get(5)?,
        created_at: parse_timestamp(&row.get::<_, String>(6)?)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn list_returns_newest_first() {
        let db = Database::new_in_memory().unwrap();
        db.executions
            .append("node", "console.log(1)", Some("1\n"), None, Some(0))
            .unwrap();
        db.executions
            .append("python", "print(2)", Some("2\n"), None, Some(0))
            .unwrap();

        let executions = db.executions.list(20).unwrap();
        assert_eq!(executions.len(), 2);
        assert_eq!(executions[0].language, "python");
        assert_eq!(executions[1].language, "node");
    }

    #[test]
    fn limit_caps_rows() {
        let db = Database::new_in_memory().unwrap();
        for i in 0..4 {
            db.executions
                .append("node", &format!("run {}", i), None, None, None)
                .unwrap();
        }
        assert_eq!(db.executions.list(2).unwrap().len(), 2);
    }
}
