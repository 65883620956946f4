//! Project persistence. Files are stored as a JSON array in a single
//! column and replaced wholesale on update.

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};
use tracing::debug;
use uuid::Uuid;

use super::schema::{Project, ProjectFile};
use super::{parse_timestamp, DbPool};

/// Partial update for a project; `None` fields keep their stored value.
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub files: Option<Vec<ProjectFile>>,
}

pub struct ProjectStore {
    pool: DbPool,
}

impl ProjectStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(
        &self,
        name: &str,
        description: Option<&str>,
        files: &[ProjectFile],
    ) -> Result<Project> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let files_json = serde_json::to_string(files)?;

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO projects (id, name, description, files, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &id,
                name,
                description,
                files_json,
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )?;

        debug!("Created project {}", id);
        Ok(Project {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
            files: files.to_vec(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<Project>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, files, created_at, updated_at
             FROM projects WHERE id = ?1",
        )?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_project(row)?)),
            None => Ok(None),
        }
    }

    /// Most recently updated first.
    pub fn list(&self) -> Result<Vec<Project>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, description, files, created_at, updated_at
             FROM projects ORDER BY updated_at DESC, id",
        )?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(row_to_project(row)?);
        }
        Ok(projects)
    }

    /// Applies the provided fields and bumps `updated_at`. Returns `None`
    /// when the id is unknown. Concurrent updates are last-write-wins.
    pub fn update(&self, id: &str, changes: ProjectChanges) -> Result<Option<Project>> {
        let existing = match self.get(id)? {
            Some(p) => p,
            None => return Ok(None),
        };

        let name = changes.name.unwrap_or(existing.name);
        let description = changes.description.or(existing.description);
        let files = changes.files.unwrap_or(existing.files);
        let now = Utc::now();
        let files_json = serde_json::to_string(&files)?;

        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE projects
             SET name = ?1, description = ?2, files = ?3, updated_at = ?4
             WHERE id = ?5",
            params![&name, &description, files_json, now.to_rfc3339(), id],
        )?;

        debug!("Updated project {}", id);
        Ok(Some(Project {
            id: id.to_string(),
            name,
            description,
            files,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Returns false when no row matched.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        if deleted > 0 {
            debug!("Deleted project {}", id);
        }
        Ok(deleted > 0)
    }
}

fn row_to_project(row: &Row<'_>) -> Result<Project> {
    let files_json: String = row.get(3)?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        files: serde_json::from_str(&files_json)?,
        created_at: parse_timestamp(&row.get::<_, String>(4)?)?,
        updated_at: parse_timestamp(&row.get::<_, String>(5)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn sample_files() -> Vec<ProjectFile> {
        vec![
            ProjectFile {
                path: "src/main.js".into(),
                content: "console.log(1)".into(),
                language: Some("javascript".into()),
            },
            ProjectFile {
                path: "README.md".into(),
                content: "# demo".into(),
                language: None,
            },
        ]
    }

    #[test]
    fn create_read_roundtrip_preserves_file_order() {
        let db = Database::new_in_memory().unwrap();
        let files = sample_files();
        let created = db
            .projects
            .create("demo", Some("a demo"), &files)
            .unwrap();

        let fetched = db.projects.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "demo");
        assert_eq!(fetched.description.as_deref(), Some("a demo"));
        assert_eq!(fetched.files, files);
    }

    #[test]
    fn update_merges_fields_and_bumps_timestamp() {
        let db = Database::new_in_memory().unwrap();
        let created = db.projects.create("demo", None, &[]).unwrap();

        let updated = db
            .projects
            .update(
                &created.id,
                ProjectChanges {
                    files: Some(sample_files()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "demo");
        assert_eq!(updated.files.len(), 2);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let db = Database::new_in_memory().unwrap();
        let result = db
            .projects
            .update("nope", ProjectChanges::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn delete_reports_missing_rows() {
        let db = Database::new_in_memory().unwrap();
        let created = db.projects.create("demo", None, &[]).unwrap();
        assert!(db.projects.delete(&created.id).unwrap());
        assert!(!db.projects.delete(&created.id).unwrap());
        assert!(db.projects.get(&created.id).unwrap().is_none());
    }
}
