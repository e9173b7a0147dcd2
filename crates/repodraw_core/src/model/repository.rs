//! Repository identity model.
//!
//! # Responsibility
//! - Carry the external identity of one source-code repository.
//!
//! # Invariants
//! - `id` is assigned by an external collaborator and never changed here.

use serde::{Deserialize, Serialize};

/// Stable identifier for a source repository.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type RepoId = i64;

/// Identity record for one source-code repository.
///
/// Core only reads this; creation and mutation belong to an external
/// collaborator. The `source_url` is the only repository content the
/// prompt builder is allowed to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// External primary key.
    pub id: RepoId,
    /// Public URL of the repository source tree.
    pub source_url: String,
}

impl Repository {
    /// Creates a repository identity record.
    pub fn new(id: RepoId, source_url: impl Into<String>) -> Self {
        Self {
            id,
            source_url: source_url.into(),
        }
    }
}
