//! Task, comment and category storage.
//!
//! # Invariants
//! - Task positions are stored as ordinals and validated on read.
//! - Task contributor credits keep their insertion order.
//! - Comments and categories exist only while their task/project exists.

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::contributor::ContributorId;
use crate::model::project::ProjectId;
use crate::model::task::{
    BoardPosition, Category, CategoryId, Comment, CommentId, Task, TaskId,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const TASK_SELECT_SQL: &str = "SELECT id, title, points, position FROM tasks";

/// Repository interface for tasks and their dependent records.
pub trait TaskRepository {
    /// Inserts `task` under `project_id`; `task.id` is ignored.
    fn create_task(&self, project_id: ProjectId, task: &Task) -> RepoResult<TaskId>;
    /// Replaces title, points, position and credits of an existing task.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn create_comment(&self, task_id: TaskId, body: &str) -> RepoResult<Comment>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    fn create_category(&self, project_id: ProjectId, name: &str) -> RepoResult<Category>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, project_id: ProjectId, task: &Task) -> RepoResult<TaskId> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO tasks (project_id, title, points, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project_id,
                task.title.as_str(),
                task.points,
                task.position.as_ordinal(),
            ],
        )?;
        let task_id = tx.last_insert_rowid();
        insert_task_contributors(&tx, task_id, &task.contributor_ids)?;
        tx.commit()?;
        Ok(task_id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks
             SET
                title = ?2,
                points = ?3,
                position = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                task.id,
                task.title.as_str(),
                task.points,
                task.position.as_ordinal(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }
        tx.execute("DELETE FROM task_contributors WHERE task_id = ?1;", [task.id])?;
        insert_task_contributors(&tx, task.id, &task.contributor_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => {
                let mut task = parse_task_row(row)?;
                task.contributor_ids = load_task_contributors(self.conn, task.id)?;
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    fn create_comment(&self, task_id: TaskId, body: &str) -> RepoResult<Comment> {
        self.conn.execute(
            "INSERT INTO comments (task_id, body) VALUES (?1, ?2);",
            params![task_id, body],
        )?;
        Ok(Comment {
            id: self.conn.last_insert_rowid(),
            task_id,
            body: body.to_string(),
        })
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let comment = self
            .conn
            .query_row(
                "SELECT id, task_id, body FROM comments WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Comment {
                        id: row.get("id")?,
                        task_id: row.get("task_id")?,
                        body: row.get("body")?,
                    })
                },
            )
            .optional()?;
        Ok(comment)
    }

    fn create_category(&self, project_id: ProjectId, name: &str) -> RepoResult<Category> {
        self.conn.execute(
            "INSERT INTO categories (project_id, name) VALUES (?1, ?2);",
            params![project_id, name],
        )?;
        Ok(Category {
            id: self.conn.last_insert_rowid(),
            project_id,
            name: name.to_string(),
        })
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, project_id, name FROM categories WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Category {
                        id: row.get("id")?,
                        project_id: row.get("project_id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }
}

/// Loads a project's tasks in creation order, with their credits.
pub(crate) fn load_project_tasks(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "{TASK_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([project_id])?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }
    for task in &mut tasks {
        task.contributor_ids = load_task_contributors(conn, task.id)?;
    }
    Ok(tasks)
}

/// Persists the position of each task in one transaction.
pub(crate) fn save_task_positions(conn: &Connection, tasks: &[&Task]) -> RepoResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    for task in tasks {
        let changed = tx.execute(
            "UPDATE tasks
             SET
                position = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![task.id, task.position.as_ordinal()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.id,
            });
        }
    }
    tx.commit()?;
    Ok(())
}

fn insert_task_contributors(
    tx: &Transaction<'_>,
    task_id: TaskId,
    contributor_ids: &[ContributorId],
) -> RepoResult<()> {
    let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO task_contributors (task_id, contributor_id, sort_order)
         VALUES (?1, ?2, ?3);",
    )?;
    for (sort_order, contributor_id) in contributor_ids.iter().enumerate() {
        stmt.execute(params![task_id, contributor_id, sort_order as i64])?;
    }
    Ok(())
}

fn load_task_contributors(conn: &Connection, task_id: TaskId) -> RepoResult<Vec<ContributorId>> {
    let mut stmt = conn.prepare(
        "SELECT contributor_id
         FROM task_contributors
         WHERE task_id = ?1
         ORDER BY sort_order ASC;",
    )?;
    let ids = stmt
        .query_map([task_id], |row| row.get(0))?
        .collect::<Result<Vec<ContributorId>, _>>()?;
    Ok(ids)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;

    let ordinal: i64 = row.get("position")?;
    let position = BoardPosition::from_ordinal(ordinal).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid position `{ordinal}` in tasks.position"))
    })?;

    let points = match row.get::<_, Option<i64>>("points")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid points `{value}` in tasks.points"))
        })?),
        None => None,
    };

    Ok(Task {
        id,
        title: row.get("title")?,
        points,
        position,
        contributor_ids: Vec::new(),
    })
}
