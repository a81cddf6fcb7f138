//! Contributor references and token-input encoding.
//!
//! # Responsibility
//! - Define the `{id, name}` contributor record.
//! - Encode contributor lists for the token-input widget.
//! - Parse comma separated contributor tokens.
//!
//! # Invariants
//! - Token-input JSON is compact and field order is always `id`, `name`.
//! - Parsed tokens keep first-occurrence order and contain no duplicates.

use super::project::ProjectValidationError;
use serde::{Deserialize, Serialize};

/// Storage-assigned contributor identifier.
pub type ContributorId = i64;

/// Person who owns or works on projects.
///
/// Field declaration order is the serialized field order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contributor {
    pub id: ContributorId,
    pub name: String,
}

/// Encodes contributors as the compact JSON list consumed by token inputs.
///
/// Example: `[{"id":1,"name":"Hugo"},{"id":2,"name":"Rodrigo"}]`.
pub fn contributors_for_token_input(
    contributors: &[Contributor],
) -> Result<String, serde_json::Error> {
    serde_json::to_string(contributors)
}

/// Parses a comma separated id list such as `"1, 2,3"`.
///
/// Blank tokens are skipped, so an empty string yields an empty set.
///
/// # Errors
/// - Returns `InvalidContributorToken` for any non-integer token.
pub fn parse_contributor_tokens(
    ids_csv: &str,
) -> Result<Vec<ContributorId>, ProjectValidationError> {
    let mut ids = Vec::new();
    for token in ids_csv.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let id = token
            .parse::<ContributorId>()
            .map_err(|_| ProjectValidationError::InvalidContributorToken(token.to_string()))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
