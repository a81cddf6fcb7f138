//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case level APIs.
//! - Keep callers (CLI, future web layer) decoupled from storage details.

pub mod project_service;
