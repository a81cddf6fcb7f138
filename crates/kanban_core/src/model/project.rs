//! Project domain model and identity policy.
//!
//! # Responsibility
//! - Validate and normalize project names and owners.
//! - Provide project-level views over tasks and contributors.
//! - Define the default project ordering.
//!
//! # Invariants
//! - A stored name is non-empty, lowercase and matches `[a-z0-9_-]+`.
//! - `(name, owner_id)` is unique among persisted projects; storage enforces
//!   it with a unique constraint, services pre-check it for a typed error.
//! - The owner is always part of `all_contributors()`.

use super::contributor::{parse_contributor_tokens, ContributorId};
use super::task::{BoardPosition, Task};
use crate::board::aggregate;
use crate::board::score::{self, ContributorScore};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned project identifier.
pub type ProjectId = i64;

static PROJECT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid project name regex"));

/// Validation failures for project identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    /// Owner reference is missing.
    EmptyOwner,
    /// Name is missing or empty.
    EmptyName,
    /// Name contains characters outside `[A-Za-z0-9_-]`.
    InvalidFormat(String),
    /// Another project of the same owner already uses this name.
    DuplicateName {
        name: String,
        owner_id: ContributorId,
    },
    /// Contributor token is not an integer id.
    InvalidContributorToken(String),
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwner => write!(f, "owner can't be blank"),
            Self::EmptyName => write!(f, "name can't be blank"),
            Self::InvalidFormat(value) => write!(
                f,
                "name `{value}` may only contain letters, digits, underscores and hyphens"
            ),
            Self::DuplicateName { name, owner_id } => write!(
                f,
                "name `{name}` is already taken for owner {owner_id}"
            ),
            Self::InvalidContributorToken(token) => {
                write!(f, "invalid contributor token `{token}`")
            }
        }
    }
}

impl Error for ProjectValidationError {}

/// Canonical lowercase project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProjectName(String);

impl ProjectName {
    /// Validates a raw name and lowercases it.
    ///
    /// # Errors
    /// - `EmptyName` when `raw` is empty or all whitespace.
    /// - `InvalidFormat` when any character is outside `[A-Za-z0-9_-]`,
    ///   which includes whitespace around or inside a non-blank name.
    pub fn parse(raw: &str) -> Result<Self, ProjectValidationError> {
        if raw.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        if !PROJECT_NAME_RE.is_match(raw) {
            return Err(ProjectValidationError::InvalidFormat(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Returns the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuilds a name read back from storage.
    ///
    /// Storage only ever receives validated names, but the value is checked
    /// again so corrupted rows surface as errors instead of bad identities.
    pub(crate) fn from_stored(value: String) -> Result<Self, ProjectValidationError> {
        let parsed = Self::parse(&value)?;
        if parsed.0 != value {
            return Err(ProjectValidationError::InvalidFormat(value));
        }
        Ok(parsed)
    }
}

impl Display for ProjectName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validates the identity fields of a project about to be saved.
///
/// Returns the normalized name on success. Uniqueness is not checked here;
/// it needs storage and lives in the project service.
///
/// # Errors
/// - `EmptyOwner` when `owner_id` is `None` (checked first).
/// - `EmptyName` / `InvalidFormat` as described on [`ProjectName::parse`].
pub fn validate_and_normalize(
    name: Option<&str>,
    owner_id: Option<ContributorId>,
) -> Result<ProjectName, ProjectValidationError> {
    if owner_id.is_none() {
        return Err(ProjectValidationError::EmptyOwner);
    }
    ProjectName::parse(name.unwrap_or_default())
}

/// Persisted project with its contributor references and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: ProjectName,
    pub owner_id: ContributorId,
    /// Explicit contributors, in insertion order. The owner is only listed
    /// here when added separately.
    pub contributor_ids: Vec<ContributorId>,
    /// Owned tasks in creation order.
    pub tasks: Vec<Task>,
}

impl Project {
    /// Creates an in-memory project without contributors or tasks.
    pub fn new(id: ProjectId, name: ProjectName, owner_id: ContributorId) -> Self {
        Self {
            id,
            name,
            owner_id,
            contributor_ids: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Returns the owner together with every explicit contributor.
    pub fn all_contributors(&self) -> BTreeSet<ContributorId> {
        let mut all: BTreeSet<ContributorId> = self.contributor_ids.iter().copied().collect();
        all.insert(self.owner_id);
        all
    }

    /// Replaces the contributor set with the ids in `ids_csv`.
    ///
    /// The previous set is kept untouched when parsing fails.
    pub fn set_contributor_tokens(&mut self, ids_csv: &str) -> Result<(), ProjectValidationError> {
        self.contributor_ids = parse_contributor_tokens(ids_csv)?;
        Ok(())
    }

    /// Tasks currently in `position`, in original order.
    pub fn tasks_by_position(&self, position: BoardPosition) -> Vec<&Task> {
        aggregate::tasks_by_position(&self.tasks, position)
    }

    /// Point sum of the tasks in `position`.
    pub fn count_points(&self, position: BoardPosition) -> u64 {
        aggregate::count_points(&self.tasks, position)
    }

    /// Moves every done task to `out`. Returns how many tasks moved.
    pub fn clean_up_done_tasks(&mut self) -> usize {
        aggregate::clean_up_done_tasks(&mut self.tasks)
    }

    /// Ranked contributor scores over done tasks.
    pub fn contributors_scores(&self) -> Vec<ContributorScore> {
        score::contributors_scores(&self.tasks)
    }

    /// Default project ordering: case-insensitive name, then id.
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name
            .as_str()
            .to_lowercase()
            .cmp(&other.name.as_str().to_lowercase())
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Sorts projects with [`Project::cmp_by_name`].
pub fn sort_by_name(projects: &mut [Project]) {
    projects.sort_by(Project::cmp_by_name);
}
