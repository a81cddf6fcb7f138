//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from services and board logic.
//!
//! # Invariants
//! - Repositories only accept connections at the latest schema version.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Deleting a project removes its tasks, comments and categories in the
//!   same statement through foreign-key cascades.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::project::ProjectValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod contributor_repo;
pub mod project_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by project, task and contributor storage.
#[derive(Debug)]
pub enum RepoError {
    /// Identity rule violated, including storage-level name conflicts.
    Validation(ProjectValidationError),
    Db(DbError),
    /// Target row does not exist.
    NotFound { entity: &'static str, id: i64 },
    /// Persisted row cannot be converted to a valid domain value.
    InvalidData(String),
    /// Connection was not opened through `db::open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Connection has `foreign_keys=OFF`, so cascades would not run.
    ForeignKeysDisabled,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::ForeignKeysDisabled => {
                write!(f, "repository requires `PRAGMA foreign_keys = ON`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::ForeignKeysDisabled => None,
        }
    }
}

impl From<ProjectValidationError> for RepoError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
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

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        return Err(RepoError::ForeignKeysDisabled);
    }
    Ok(())
}
