//! Project storage.
//!
//! # Responsibility
//! - Persist projects with their owner and contributor references.
//! - Load projects together with their ordered tasks.
//! - Delete projects with their whole dependency tree.
//!
//! # Invariants
//! - Names are written already normalized; the `UNIQUE(name, owner_id)`
//!   constraint is the authoritative duplicate check.
//! - Listing is ordered by id; the default name ordering belongs to the
//!   service.

use super::contributor_repo::get_contributor;
use super::task_repo::{load_project_tasks, save_task_positions};
use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::db::DbError;
use crate::model::contributor::{Contributor, ContributorId};
use crate::model::project::{Project, ProjectId, ProjectName, ProjectValidationError};
use crate::model::task::Task;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const PROJECT_SELECT_SQL: &str = "SELECT id, name, owner_id FROM projects";

/// Repository interface for projects.
pub trait ProjectRepository {
    /// Inserts a project and its contributor references.
    fn create_project(
        &self,
        name: &ProjectName,
        owner_id: ContributorId,
        contributor_ids: &[ContributorId],
    ) -> RepoResult<ProjectId>;
    /// Stores a new normalized name for an existing project.
    fn rename_project(&self, id: ProjectId, name: &ProjectName) -> RepoResult<()>;
    /// Loads one project with contributor ids and tasks.
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Loads every project. Callers apply the default ordering.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Looks up the project using `name` for `owner_id`.
    fn find_project_id(
        &self,
        name: &ProjectName,
        owner_id: ContributorId,
    ) -> RepoResult<Option<ProjectId>>;
    /// Replaces the explicit contributor set in one transaction.
    fn set_contributor_ids(&self, id: ProjectId, contributor_ids: &[ContributorId])
        -> RepoResult<()>;
    /// Loads explicit contributors in insertion order.
    fn list_project_contributors(&self, id: ProjectId) -> RepoResult<Vec<Contributor>>;
    /// Persists the positions of the given tasks in one transaction.
    fn save_task_positions(&self, tasks: &[&Task]) -> RepoResult<()>;
    /// Deletes a project together with its tasks, comments and categories.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(
        &self,
        name: &ProjectName,
        owner_id: ContributorId,
        contributor_ids: &[ContributorId],
    ) -> RepoResult<ProjectId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO projects (name, owner_id) VALUES (?1, ?2);",
            params![name.as_str(), owner_id],
        )
        .map_err(|err| map_project_write_error(err, name, owner_id))?;
        let project_id = tx.last_insert_rowid();
        insert_project_contributors(&tx, project_id, contributor_ids)?;
        tx.commit()?;
        Ok(project_id)
    }

    fn rename_project(&self, id: ProjectId, name: &ProjectName) -> RepoResult<()> {
        let owner_id: ContributorId = self
            .conn
            .query_row("SELECT owner_id FROM projects WHERE id = ?1;", [id], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(RepoError::NotFound {
                entity: "project",
                id,
            })?;

        self.conn
            .execute(
                "UPDATE projects
                 SET
                    name = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![id, name.as_str()],
            )
            .map_err(|err| map_project_write_error(err, name, owner_id))?;
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.hydrate(parse_project_row(row)?)?)),
            None => Ok(None),
        }
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        projects
            .into_iter()
            .map(|project| self.hydrate(project))
            .collect()
    }

    fn find_project_id(
        &self,
        name: &ProjectName,
        owner_id: ContributorId,
    ) -> RepoResult<Option<ProjectId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM projects WHERE name = ?1 AND owner_id = ?2;",
                params![name.as_str(), owner_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn set_contributor_ids(
        &self,
        id: ProjectId,
        contributor_ids: &[ContributorId],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        tx.execute(
            "DELETE FROM project_contributors WHERE project_id = ?1;",
            [id],
        )?;
        insert_project_contributors(&tx, id, contributor_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn list_project_contributors(&self, id: ProjectId) -> RepoResult<Vec<Contributor>> {
        load_contributor_ids(self.conn, id)?
            .into_iter()
            .map(|contributor_id| {
                get_contributor(self.conn, contributor_id)?.ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "project {id} references missing contributor {contributor_id}"
                    ))
                })
            })
            .collect()
    }

    fn save_task_positions(&self, tasks: &[&Task]) -> RepoResult<()> {
        save_task_positions(self.conn, tasks)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }
}

impl SqliteProjectRepository<'_> {
    fn hydrate(&self, mut project: Project) -> RepoResult<Project> {
        project.contributor_ids = load_contributor_ids(self.conn, project.id)?;
        project.tasks = load_project_tasks(self.conn, project.id)?;
        Ok(project)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id: ProjectId = row.get("id")?;
    let stored_name: String = row.get("name")?;
    let name = ProjectName::from_stored(stored_name).map_err(|err| {
        RepoError::InvalidData(format!("invalid name in projects.name for project {id}: {err}"))
    })?;
    Ok(Project::new(id, name, row.get("owner_id")?))
}

fn insert_project_contributors(
    tx: &Transaction<'_>,
    project_id: ProjectId,
    contributor_ids: &[ContributorId],
) -> RepoResult<()> {
    // Why: callers may pass an id twice; the first listing keeps its
    // sort_order and later ones are dropped by the primary key.
    let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO project_contributors (project_id, contributor_id, sort_order)
         VALUES (?1, ?2, ?3);",
    )?;
    for (sort_order, &contributor_id) in contributor_ids.iter().enumerate() {
        stmt.execute(params![project_id, contributor_id, sort_order as i64])
            .map_err(|err| map_missing_contributor(err, contributor_id))?;
    }
    Ok(())
}

fn load_contributor_ids(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<ContributorId>> {
    let mut stmt = conn.prepare(
        "SELECT contributor_id
         FROM project_contributors
         WHERE project_id = ?1
         ORDER BY sort_order ASC;",
    )?;
    let ids = stmt
        .query_map([project_id], |row| row.get(0))?
        .collect::<Result<Vec<ContributorId>, _>>()?;
    Ok(ids)
}

fn map_project_write_error(
    err: rusqlite::Error,
    name: &ProjectName,
    owner_id: ContributorId,
) -> RepoError {
    let err = DbError::from(err);
    if err.is_unique_violation() {
        return RepoError::Validation(ProjectValidationError::DuplicateName {
            name: name.as_str().to_string(),
            owner_id,
        });
    }
    if err.is_foreign_key_violation() {
        return RepoError::NotFound {
            entity: "contributor",
            id: owner_id,
        };
    }
    RepoError::Db(err)
}

fn map_missing_contributor(err: rusqlite::Error, contributor_id: ContributorId) -> RepoError {
    let err = DbError::from(err);
    if err.is_foreign_key_violation() {
        return RepoError::NotFound {
            entity: "contributor",
            id: contributor_id,
        };
    }
    RepoError::Db(err)
}
