//! Database schema definitions for the dashboard record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One file inside a project. Paths are relative; uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub files: Vec<ProjectFile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub role: String,
    pub content: String,
    pub code_context: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExecution {
    pub id: i64,
    pub language: String,
    pub code: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Singleton operator configuration. The table carries `CHECK (id = 1)` so
/// the one-row invariant holds at the schema level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub const SCHEMA_SQL: &str = "
-- Projects table
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    files TEXT NOT NULL DEFAULT '[]',
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);
-- Chat messages table
CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    code_context TEXT,
    created_at TIMESTAMP NOT NULL
);
-- Code executions table
CREATE TABLE IF NOT EXISTS code_executions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL,
    code TEXT NOT NULL,
    stdout TEXT,
    stderr TEXT,
    exit_code INTEGER,
    created_at TIMESTAMP NOT NULL
);
-- Operator config (single row)
CREATE TABLE IF NOT EXISTS user_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    backend_url TEXT,
    api_key TEXT,
    updated_at TIMESTAMP NOT NULL
);
-- Bearer-token sessions
CREATE TABLE IF NOT EXISTS auth_sessions (
    token TEXT PRIMARY KEY,
    created_at TIMESTAMP NOT NULL,
    expires_at TIMESTAMP NOT NULL
);
-- Indexes for performance
CREATE INDEX IF NOT EXISTS idx_projects_updated ON projects (updated_at);
CREATE INDEX IF NOT EXISTS idx_chat_messages_created ON chat_messages (created_at);
CREATE INDEX IF NOT EXISTS idx_code_executions_created ON code_executions (created_at);
CREATE INDEX IF NOT EXISTS idx_auth_sessions_expires ON auth_sessions (expires_at);
";
