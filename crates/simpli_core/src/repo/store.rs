//! SQLite-backed store handle, repository errors and the working context.
//!
//! # Responsibility
//! - Wrap one migrated connection as the project/item store.
//! - Provide commit-or-rollback units of work for the service layer.
//! - Verify the connection schema before any repository call.
//!
//! # Invariants
//! - A unit of work either commits every write or none of them.
//! - Repository APIs return semantic errors (`ProjectNotFound`,
//!   `ItemNotFound`) in addition to DB transport errors.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::ItemId;
use crate::model::project::ProjectId;
use log::{error, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for project/item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    ProjectNotFound(ProjectId),
    ItemNotFound(ItemId),
    /// Persisted row cannot be converted into a valid domain record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "project store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "project store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "project store requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Commit/rollback boundary over the store's working session.
pub trait WorkingContext {
    /// Runs `work` as one unit: commits on `Ok`, rolls back on `Err`.
    ///
    /// A failed commit is reverted and reported as `Err`.
    fn run_in_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce() -> RepoResult<T>;
}

/// Project/item store over one migrated SQLite connection.
///
/// Implements [`ProjectRepository`](crate::repo::project_repo::ProjectRepository),
/// [`ItemRepository`](crate::repo::item_repo::ItemRepository) and
/// [`WorkingContext`].
pub struct SqliteStore<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    /// Creates a store from a connection returned by `open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl WorkingContext for SqliteStore<'_> {
    fn run_in_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce() -> RepoResult<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        match work() {
            Ok(value) => {
                // Dropping a transaction whose COMMIT failed rolls it back.
                tx.commit().map_err(|err| {
                    error!(
                        "event=store_commit module=repo status=error error_code=commit_failed error={err}"
                    );
                    RepoError::from(err)
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=store_rollback module=repo status=error error={rollback_err}"
                    );
                }
                Err(err)
            }
        }
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    const REQUIRED: [(&str, &[&str]); 2] = [
        (
            "projects",
            &["uuid", "title", "color", "closed", "date_created"],
        ),
        (
            "items",
            &[
                "uuid",
                "project_uuid",
                "title",
                "completed",
                "priority",
                "completion_date",
            ],
        ),
    ];

    for (table, columns) in REQUIRED {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
