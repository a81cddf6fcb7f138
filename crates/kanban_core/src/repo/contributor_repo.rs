//! Contributor storage.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::contributor::{Contributor, ContributorId};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for contributor records.
pub trait ContributorRepository {
    /// Inserts a contributor and returns it with its assigned id.
    fn create_contributor(&self, name: &str) -> RepoResult<Contributor>;
    fn get_contributor(&self, id: ContributorId) -> RepoResult<Option<Contributor>>;
    /// Loads contributors in the order of `ids`; fails on any unknown id.
    fn list_contributors(&self, ids: &[ContributorId]) -> RepoResult<Vec<Contributor>>;
}

/// SQLite-backed contributor repository.
pub struct SqliteContributorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContributorRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContributorRepository for SqliteContributorRepository<'_> {
    fn create_contributor(&self, name: &str) -> RepoResult<Contributor> {
        self.conn
            .execute("INSERT INTO contributors (name) VALUES (?1);", params![name])?;
        Ok(Contributor {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn get_contributor(&self, id: ContributorId) -> RepoResult<Option<Contributor>> {
        get_contributor(self.conn, id)
    }

    fn list_contributors(&self, ids: &[ContributorId]) -> RepoResult<Vec<Contributor>> {
        ids.iter()
            .map(|&id| {
                get_contributor(self.conn, id)?.ok_or(RepoError::NotFound {
                    entity: "contributor",
                    id,
                })
            })
            .collect()
    }
}

pub(crate) fn get_contributor(
    conn: &Connection,
    id: ContributorId,
) -> RepoResult<Option<Contributor>> {
    let contributor = conn
        .query_row(
            "SELECT id, name FROM contributors WHERE id = ?1;",
            [id],
            |row| {
                Ok(Contributor {
                    id: row.get("id")?,
                    name: row.get("name")?,
                })
            },
        )
        .optional()?;
    Ok(contributor)
}
