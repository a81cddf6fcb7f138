//! Per-column task grouping, point sums and done-task clean-up.

use crate::model::task::{BoardPosition, Task};
use serde::Serialize;

/// Returns the tasks in `position`, preserving their relative order.
pub fn tasks_by_position(tasks: &[Task], position: BoardPosition) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_at(position)).collect()
}

/// Sums the points of the tasks in `position`. Unestimated tasks count as 0.
pub fn count_points(tasks: &[Task], position: BoardPosition) -> u64 {
    tasks
        .iter()
        .filter(|task| task.is_at(position))
        .map(|task| u64::from(task.points.unwrap_or(0)))
        .sum()
}

/// Moves every `done` task to `out` and leaves the others untouched.
///
/// Returns the number of tasks moved; a second run returns 0.
pub fn clean_up_done_tasks(tasks: &mut [Task]) -> usize {
    let mut moved = 0;
    for task in tasks.iter_mut().filter(|task| task.is_at(BoardPosition::Done)) {
        task.position = BoardPosition::Out;
        moved += 1;
    }
    moved
}

/// Task count and point sum of one board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub position: BoardPosition,
    pub task_count: usize,
    pub points: u64,
}

/// Column summaries for a whole board, in board order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub columns: Vec<ColumnSummary>,
}

impl BoardSummary {
    /// Returns the summary of one column.
    pub fn column(&self, position: BoardPosition) -> Option<&ColumnSummary> {
        self.columns.iter().find(|column| column.position == position)
    }
}

/// Summarizes every column of the board, including empty ones.
pub fn summarize(tasks: &[Task]) -> BoardSummary {
    let columns = BoardPosition::ALL
        .iter()
        .map(|&position| ColumnSummary {
            position,
            task_count: tasks.iter().filter(|task| task.is_at(position)).count(),
            points: count_points(tasks, position),
        })
        .collect();
    BoardSummary { columns }
}
