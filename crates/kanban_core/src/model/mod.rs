//! Domain model for projects, tasks and contributors.
//!
//! # Responsibility
//! - Define canonical records consumed by board aggregation and services.
//! - Own project identity rules (name normalization, owner requirement).
//!
//! # Invariants
//! - Identifiers are assigned by storage and never reused.
//! - A `ProjectName` can only be obtained through validation.

pub mod contributor;
pub mod project;
pub mod task;
