//! Task domain model and board positions.
//!
//! # Responsibility
//! - Define the task record aggregated by the board and score ledger.
//! - Map board positions to their stable storage ordinals.
//!
//! # Invariants
//! - `points == None` means "not yet estimated" and is distinct from `Some(0)`.
//! - Position ordinals are stable: backlog=0, todo=1, doing=2, done=3, out=4.

use super::contributor::ContributorId;
use super::project::ProjectId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned task identifier.
pub type TaskId = i64;

/// Board column a task currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardPosition {
    /// Not yet planned.
    Backlog,
    /// Planned for the current iteration.
    Todo,
    /// Work is in progress.
    Doing,
    /// Completed and still shown on the board.
    Done,
    /// Completed and archived off the board.
    Out,
}

impl BoardPosition {
    /// Every column in board order.
    pub const ALL: [BoardPosition; 5] = [
        BoardPosition::Backlog,
        BoardPosition::Todo,
        BoardPosition::Doing,
        BoardPosition::Done,
        BoardPosition::Out,
    ];

    /// Returns the ordinal persisted in `tasks.position`.
    pub const fn as_ordinal(self) -> i64 {
        match self {
            Self::Backlog => 0,
            Self::Todo => 1,
            Self::Doing => 2,
            Self::Done => 3,
            Self::Out => 4,
        }
    }

    /// Maps a persisted ordinal back to a position.
    pub const fn from_ordinal(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Backlog),
            1 => Some(Self::Todo),
            2 => Some(Self::Doing),
            3 => Some(Self::Done),
            4 => Some(Self::Out),
            _ => None,
        }
    }

    /// Returns the symbolic column name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Out => "out",
        }
    }
}

impl Display for BoardPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a board column name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBoardPositionError(pub String);

impl Display for ParseBoardPositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown board position `{}`; expected backlog|todo|doing|done|out",
            self.0
        )
    }
}

impl Error for ParseBoardPositionError {}

impl TryFrom<&str> for BoardPosition {
    type Error = ParseBoardPositionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            "out" => Ok(Self::Out),
            _ => Err(ParseBoardPositionError(value.to_string())),
        }
    }
}

/// Task card owned by exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Estimate in points. `None` until estimated.
    pub points: Option<u32>,
    pub position: BoardPosition,
    /// Contributors credited for this task, in credit order.
    pub contributor_ids: Vec<ContributorId>,
}

impl Task {
    /// Creates an unsaved task value at the given position.
    ///
    /// Storage replaces `id` on insert; in-memory callers may keep `0`.
    pub fn new(title: impl Into<String>, position: BoardPosition) -> Self {
        Self {
            id: 0,
            title: title.into(),
            points: None,
            position,
            contributor_ids: Vec::new(),
        }
    }

    /// Sets the estimate.
    pub fn with_points(mut self, points: Option<u32>) -> Self {
        self.points = points;
        self
    }

    /// Replaces the credited contributors.
    pub fn with_contributors(mut self, contributor_ids: &[ContributorId]) -> Self {
        self.contributor_ids = contributor_ids.to_vec();
        self
    }

    /// Returns whether this task sits in the given column.
    pub fn is_at(&self, position: BoardPosition) -> bool {
        self.position == position
    }
}

/// Storage-assigned comment identifier.
pub type CommentId = i64;

/// Comment attached to one task; deleted together with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub body: String,
}

/// Storage-assigned category identifier.
pub type CategoryId = i64;

/// Project-scoped task category; deleted together with its project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub project_id: ProjectId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::BoardPosition;

    #[test]
    fn ordinals_roundtrip_for_every_position() {
        for position in BoardPosition::ALL {
            assert_eq!(
                BoardPosition::from_ordinal(position.as_ordinal()),
                Some(position)
            );
        }
        assert_eq!(BoardPosition::from_ordinal(5), None);
        assert_eq!(BoardPosition::from_ordinal(-1), None);
    }

    #[test]
    fn parses_symbolic_names_case_insensitively() {
        assert_eq!(BoardPosition::try_from(" Done "), Ok(BoardPosition::Done));
        assert!(BoardPosition::try_from("archived").is_err());
    }
}
