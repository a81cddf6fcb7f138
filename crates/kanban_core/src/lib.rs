//! Core domain logic for the kanban tracker.
//! This crate is the single source of truth for project, board and score
//! invariants.

pub mod board;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use board::aggregate::{BoardSummary, ColumnSummary};
pub use board::score::{ContributorScore, Score};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::contributor::{Contributor, ContributorId};
pub use model::project::{
    validate_and_normalize, Project, ProjectId, ProjectName, ProjectValidationError,
};
pub use model::task::{BoardPosition, Category, Comment, Task, TaskId};
pub use repo::contributor_repo::{ContributorRepository, SqliteContributorRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::project_service::{NewProject, ProjectService, ProjectServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
