//! Contributor score ledger.
//!
//! # Invariants
//! - Only `done` tasks are scored; `out` tasks are history, not score.
//! - Every credited contributor receives the full task points (no split).
//! - An explicit `0` estimate credits `0.1`; an absent estimate credits
//!   nothing and does not create an entry.
//! - Scores are kept in tenths so repeated `0.1` credits stay exact.
//! - Ranking is descending by score; ties keep first-credit order.

use crate::model::contributor::ContributorId;
use crate::model::task::{BoardPosition, Task};
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

const ZERO_POINT_CREDIT_TENTHS: u64 = 1;

/// Fixed-point score with one decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score {
    tenths: u64,
}

impl Score {
    /// Builds a score from whole points, saturating at `u64::MAX` tenths.
    pub const fn from_points(points: u64) -> Self {
        Self {
            tenths: points.saturating_mul(10),
        }
    }

    /// Builds a score from tenths of a point.
    pub const fn from_tenths(tenths: u64) -> Self {
        Self { tenths }
    }

    /// Returns the score in tenths of a point.
    pub const fn tenths(self) -> u64 {
        self.tenths
    }

    /// Returns the score as a float, e.g. `3.2`.
    pub fn as_f64(self) -> f64 {
        self.tenths as f64 / 10.0
    }

    fn credit(&mut self, tenths: u64) {
        self.tenths = self.tenths.saturating_add(tenths);
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let whole = self.tenths / 10;
        let fraction = self.tenths % 10;
        if fraction == 0 {
            write!(f, "{whole}")
        } else {
            write!(f, "{whole}.{fraction}")
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// One ranked ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContributorScore {
    pub contributor_id: ContributorId,
    pub score: Score,
}

/// Credit a done task gives each of its contributors, in tenths.
fn task_credit_tenths(task: &Task) -> Option<u64> {
    match task.points {
        None => None,
        Some(0) => Some(ZERO_POINT_CREDIT_TENTHS),
        Some(points) => Some(u64::from(points) * 10),
    }
}

/// Computes the ranked contributor scores for a project's tasks.
pub fn contributors_scores(tasks: &[Task]) -> Vec<ContributorScore> {
    let mut ledger: Vec<ContributorScore> = Vec::new();

    for task in tasks.iter().filter(|task| task.is_at(BoardPosition::Done)) {
        let Some(credit) = task_credit_tenths(task) else {
            continue;
        };
        for (index, &contributor_id) in task.contributor_ids.iter().enumerate() {
            // Why: a contributor listed twice on one card earned it once; the
            // credit is per contributor, not per listing.
            if task.contributor_ids[..index].contains(&contributor_id) {
                continue;
            }
            match ledger
                .iter_mut()
                .find(|entry| entry.contributor_id == contributor_id)
            {
                Some(entry) => entry.score.credit(credit),
                None => {
                    let mut score = Score::default();
                    score.credit(credit);
                    ledger.push(ContributorScore {
                        contributor_id,
                        score,
                    });
                }
            }
        }
    }

    // Stable: equal scores keep first-credit order.
    ledger.sort_by(|a, b| b.score.cmp(&a.score));
    ledger
}
