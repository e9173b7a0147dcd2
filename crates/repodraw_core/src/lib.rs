//! Core domain logic for RepoDraw.
//! This crate is the single source of truth for diagram-cache invariants.

pub mod db;
pub mod llm;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod service;
pub mod store;

pub use llm::{
    ChatMessage, ChatRole, GenerationClient, GenerationError, OpenAiClient, OpenAiConfig,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::diagram::{DiagramKind, DiagramRecord, KindSpec};
pub use model::repository::{RepoId, Repository};
pub use service::diagram_service::{
    AnswerOrigin, DiagramAnswer, DiagramService, DiagramServiceError, DiagramServiceResult,
};
pub use store::diagram_store::{DiagramStore, SqliteDiagramStore};
pub use store::repository_store::{RepositoryLookup, SqliteRepositoryStore};
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
