//! Project use-case service.
//!
//! # Responsibility
//! - Run the identity policy before every project write.
//! - Expose board and score read models for a stored project.
//! - Apply the done-task clean-up and persist the moved tasks.
//!
//! # Invariants
//! - Names reach storage only after validation and lowercasing.
//! - The duplicate pre-check is a fast path for a typed error; the storage
//!   unique constraint still decides races, with the same error.
//! - Service layer remains storage-agnostic.

use crate::board::aggregate::{self, BoardSummary};
use crate::board::score::ContributorScore;
use crate::model::contributor::{
    contributors_for_token_input, parse_contributor_tokens, ContributorId,
};
use crate::model::project::{
    sort_by_name, validate_and_normalize, Project, ProjectId, ProjectName, ProjectValidationError,
};
use crate::model::task::{BoardPosition, Task};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for project use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Identity policy rejected the input.
    Validation(ProjectValidationError),
    /// Target project does not exist.
    ProjectNotFound(ProjectId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Token-input encoding failed.
    Encoding(serde_json::Error),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "failed to encode contributors: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent project state: {details}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound {
                entity: "project",
                id,
            } => Self::ProjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ProjectValidationError> for ProjectServiceError {
    fn from(value: ProjectValidationError) -> Self {
        Self::Validation(value)
    }
}

impl ProjectServiceError {
    /// Stable metadata-only code for logs.
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(ProjectValidationError::EmptyOwner) => "empty_owner",
            Self::Validation(ProjectValidationError::EmptyName) => "empty_name",
            Self::Validation(ProjectValidationError::InvalidFormat(_)) => "invalid_format",
            Self::Validation(ProjectValidationError::DuplicateName { .. }) => "duplicate_name",
            Self::Validation(ProjectValidationError::InvalidContributorToken(_)) => {
                "invalid_contributor_token"
            }
            Self::ProjectNotFound(_) => "project_not_found",
            Self::Repo(_) => "repo_error",
            Self::Encoding(_) => "encoding_error",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

/// Input for creating a project. Raw values are validated by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub name: Option<String>,
    pub owner_id: Option<ContributorId>,
    pub contributor_ids: Vec<ContributorId>,
}

impl NewProject {
    /// Builds input for `name` owned by `owner_id`, without contributors.
    pub fn new(name: impl Into<String>, owner_id: ContributorId) -> Self {
        Self {
            name: Some(name.into()),
            owner_id: Some(owner_id),
            contributor_ids: Vec::new(),
        }
    }
}

/// Project facade over repository implementations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates, normalizes and stores a new project.
    ///
    /// # Errors
    /// - `Validation(EmptyOwner | EmptyName | InvalidFormat)` for bad input.
    /// - `Validation(DuplicateName)` when the owner already has the name.
    pub fn create_project(&self, input: &NewProject) -> Result<Project, ProjectServiceError> {
        let result = self.create_project_inner(input);
        match &result {
            Ok(project) => info!(
                "event=project_create module=service status=ok project_id={} owner_id={}",
                project.id, project.owner_id
            ),
            Err(err) => warn!(
                "event=project_create module=service status=error error_code={}",
                err.code()
            ),
        }
        result
    }

    fn create_project_inner(&self, input: &NewProject) -> Result<Project, ProjectServiceError> {
        let name = validate_and_normalize(input.name.as_deref(), input.owner_id)?;
        let owner_id = input.owner_id.ok_or(ProjectValidationError::EmptyOwner)?;
        self.ensure_name_available(&name, owner_id, None)?;

        let project_id = self
            .repo
            .create_project(&name, owner_id, &input.contributor_ids)?;
        self.repo
            .get_project(project_id)?
            .ok_or(ProjectServiceError::InconsistentState(
                "created project not found in read-back",
            ))
    }

    /// Renames a project, applying the same policy as creation.
    ///
    /// Keeping the current name (in any letter case) is not a conflict.
    pub fn rename_project(
        &self,
        id: ProjectId,
        raw_name: &str,
    ) -> Result<Project, ProjectServiceError> {
        let project = self.load(id)?;
        let name = validate_and_normalize(Some(raw_name), Some(project.owner_id))?;
        self.ensure_name_available(&name, project.owner_id, Some(id))?;
        self.repo.rename_project(id, &name)?;
        info!("event=project_rename module=service status=ok project_id={id}");
        self.load(id)
    }

    /// Gets one project with its tasks.
    pub fn get_project(&self, id: ProjectId) -> Result<Option<Project>, ProjectServiceError> {
        Ok(self.repo.get_project(id)?)
    }

    /// Lists all projects in default order (case-insensitive name, then id).
    ///
    /// Repositories return projects in any order; the ordering is applied here.
    pub fn list_projects(&self) -> Result<Vec<Project>, ProjectServiceError> {
        let mut projects = self.repo.list_projects()?;
        sort_by_name(&mut projects);
        Ok(projects)
    }

    /// Replaces the explicit contributors from a comma separated id list.
    pub fn set_contributor_tokens(
        &self,
        id: ProjectId,
        ids_csv: &str,
    ) -> Result<Project, ProjectServiceError> {
        let ids = parse_contributor_tokens(ids_csv)?;
        self.repo.set_contributor_ids(id, &ids)?;
        info!(
            "event=project_contributors_set module=service status=ok project_id={id} count={}",
            ids.len()
        );
        self.load(id)
    }

    /// Returns the owner plus explicit contributors.
    pub fn all_contributors(
        &self,
        id: ProjectId,
    ) -> Result<BTreeSet<ContributorId>, ProjectServiceError> {
        Ok(self.load(id)?.all_contributors())
    }

    /// Returns the explicit contributors as compact token-input JSON.
    pub fn contributors_for_token_input(
        &self,
        id: ProjectId,
    ) -> Result<String, ProjectServiceError> {
        self.load(id)?;
        let contributors = self.repo.list_project_contributors(id)?;
        contributors_for_token_input(&contributors).map_err(ProjectServiceError::Encoding)
    }

    /// Per-column task counts and point sums.
    pub fn board_summary(&self, id: ProjectId) -> Result<BoardSummary, ProjectServiceError> {
        Ok(aggregate::summarize(&self.load(id)?.tasks))
    }

    /// Ranked contributor scores over done tasks.
    pub fn contributors_scores(
        &self,
        id: ProjectId,
    ) -> Result<Vec<ContributorScore>, ProjectServiceError> {
        Ok(self.load(id)?.contributors_scores())
    }

    /// Moves all done tasks to `out` and persists them.
    ///
    /// Returns the number of tasks moved.
    pub fn clean_up_done_tasks(&self, id: ProjectId) -> Result<usize, ProjectServiceError> {
        let mut project = self.load(id)?;
        let was_done: Vec<bool> = project
            .tasks
            .iter()
            .map(|task| task.is_at(BoardPosition::Done))
            .collect();
        let moved = project.clean_up_done_tasks();

        if moved > 0 {
            let changed: Vec<&Task> = project
                .tasks
                .iter()
                .zip(&was_done)
                .filter_map(|(task, &done)| done.then_some(task))
                .collect();
            self.repo.save_task_positions(&changed)?;
        }
        info!("event=board_cleanup module=service status=ok project_id={id} moved={moved}");
        Ok(moved)
    }

    /// Deletes a project with its tasks, comments and categories.
    pub fn delete_project(&self, id: ProjectId) -> Result<(), ProjectServiceError> {
        self.repo.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id}");
        Ok(())
    }

    fn load(&self, id: ProjectId) -> Result<Project, ProjectServiceError> {
        self.repo
            .get_project(id)?
            .ok_or(ProjectServiceError::ProjectNotFound(id))
    }

    fn ensure_name_available(
        &self,
        name: &ProjectName,
        owner_id: ContributorId,
        current: Option<ProjectId>,
    ) -> Result<(), ProjectServiceError> {
        match self.repo.find_project_id(name, owner_id)? {
            Some(existing) if Some(existing) != current => {
                Err(ProjectValidationError::DuplicateName {
                    name: name.as_str().to_string(),
                    owner_id,
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}
