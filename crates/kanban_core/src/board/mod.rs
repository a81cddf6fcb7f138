//! Read-side board computations over a project's tasks.
//!
//! # Responsibility
//! - Group and sum tasks per board column.
//! - Rank contributors by the points of their done tasks.
//!
//! # Invariants
//! - Aggregations are pure and never fail; absent points count as zero.
//! - Callers pass a consistent snapshot of one project's tasks.

pub mod aggregate;
pub mod score;
