//! Project repository contract and its SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `projects` table.
//! - Encode/decode the project color through the color blob codec.
//!
//! # Invariants
//! - Listing returns store order (insertion order); no other sort is applied.
//! - `date_created` is written once on insert and never updated.

use crate::model::color::{decode_color, encode_color};
use crate::model::project::{Project, ProjectId};
use crate::repo::store::{
    bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult, SqliteStore,
};
use rusqlite::{params, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    color,
    closed,
    date_created
FROM projects";

/// Repository interface for project records.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Overwrites title, color and closed flag.
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

impl ProjectRepository for SqliteStore<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project
            .color
            .validate()
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;

        self.conn.execute(
            "INSERT INTO projects (
                uuid,
                title,
                color,
                closed,
                date_created
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.id.to_string(),
                project.title.as_str(),
                encode_color(&project.color),
                bool_to_int(project.closed),
                project.date_created,
            ],
        )?;

        Ok(project.id)
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let raw = stmt
            .query_row([id.to_string()], read_raw_project)
            .optional()?;
        raw.map(RawProject::into_project).transpose()
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(read_raw_project(row)?.into_project()?);
        }
        Ok(projects)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project
            .color
            .validate()
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                title = ?1,
                color = ?2,
                closed = ?3
             WHERE uuid = ?4;",
            params![
                project.title.as_str(),
                encode_color(&project.color),
                bool_to_int(project.closed),
                project.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ProjectNotFound(project.id));
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ProjectNotFound(id));
        }
        Ok(())
    }
}

/// Column values as read from SQLite, before domain validation.
struct RawProject {
    uuid: String,
    title: String,
    color: Vec<u8>,
    closed: i64,
    date_created: i64,
}

fn read_raw_project(row: &Row<'_>) -> rusqlite::Result<RawProject> {
    Ok(RawProject {
        uuid: row.get("uuid")?,
        title: row.get("title")?,
        color: row.get("color")?,
        closed: row.get("closed")?,
        date_created: row.get("date_created")?,
    })
}

impl RawProject {
    fn into_project(self) -> RepoResult<Project> {
        let color = decode_color(&self.color).map_err(|err| {
            RepoError::InvalidData(format!("invalid blob in projects.color: {err}"))
        })?;
        Ok(Project {
            id: parse_uuid(&self.uuid, "projects.uuid")?,
            title: self.title,
            color,
            closed: int_to_bool(self.closed, "projects.closed")?,
            date_created: self.date_created,
        })
    }
}
