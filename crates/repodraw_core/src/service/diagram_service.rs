//! Generate-or-fetch orchestration for diagram scripts.
//!
//! # Responsibility
//! - Decide per (repository, kind) whether to serve the cached script or
//!   synthesize, persist and return a fresh one.
//! - Coalesce concurrent misses for one unit of work into one model call.
//!
//! # Invariants
//! - The record is written only after a successful model call; a failed
//!   generation leaves any existing record untouched.
//! - A write covers exactly the generated kind's field; parallel flights
//!   for other kinds of the same repository are never overwritten.
//! - Repeat calls after a successful generation never invoke the model.
//! - Generated text is not returned unless it was durably stored.

use crate::llm::{extract_diagram_script, GenerationClient, GenerationError};
use crate::model::diagram::DiagramKind;
use crate::model::repository::{RepoId, Repository};
use crate::prompt;
use crate::service::single_flight::FlightTable;
use crate::store::diagram_store::DiagramStore;
use crate::store::repository_store::RepositoryLookup;
use crate::store::StoreError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Default chat model used for diagram synthesis.
pub const DEFAULT_MODEL_ID: &str = "gpt-4o";

pub type DiagramServiceResult<T> = Result<T, DiagramServiceError>;

/// Classified failure of one generate-or-fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramServiceError {
    /// No repository exists for the requested id.
    RepositoryNotFound(RepoId),
    /// The external model call failed; nothing was written.
    Generation(GenerationError),
    /// Lookup or save failed at the storage boundary.
    Persistence(StoreError),
}

impl Display for DiagramServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepositoryNotFound(id) => write!(f, "repository not found: {id}"),
            Self::Generation(err) => write!(f, "diagram generation failed: {err}"),
            Self::Persistence(err) => write!(f, "diagram persistence failed: {err}"),
        }
    }
}

impl Error for DiagramServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RepositoryNotFound(_) => None,
            Self::Generation(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<StoreError> for DiagramServiceError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value)
    }
}

impl From<GenerationError> for DiagramServiceError {
    fn from(value: GenerationError) -> Self {
        Self::Generation(value)
    }
}

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOrigin {
    /// Served from a previously stored script.
    Cached,
    /// Freshly synthesized (or coalesced onto that synthesis).
    Generated,
}

impl AnswerOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Generated => "generated",
        }
    }
}

impl Display for AnswerOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result envelope for one generate-or-fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramAnswer {
    /// The diagram script in the kind's Mermaid notation.
    pub text: String,
    /// Cache-hit or fresh-generation tag.
    pub origin: AnswerOrigin,
}

/// One cacheable unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FlightKey {
    repository_id: RepoId,
    kind: DiagramKind,
}

type FlightPayload = (Arc<str>, AnswerOrigin);

/// Orchestrator for the generate-or-fetch use case.
///
/// Collaborators arrive through the constructor; the service itself is
/// storage- and transport-agnostic.
pub struct DiagramService<L, S, G> {
    repositories: L,
    diagrams: S,
    client: G,
    model_id: String,
    flights: FlightTable<FlightKey, DiagramServiceResult<FlightPayload>>,
}

impl<L, S, G> DiagramService<L, S, G>
where
    L: RepositoryLookup,
    S: DiagramStore,
    G: GenerationClient,
{
    /// Creates a service with the default model id.
    pub fn new(repositories: L, diagrams: S, client: G) -> Self {
        Self {
            repositories,
            diagrams,
            client,
            model_id: DEFAULT_MODEL_ID.to_string(),
            flights: FlightTable::new(),
        }
    }

    /// Overrides the chat model used for fresh generations.
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Returns the cached script for `(repository_id, kind)` or generates,
    /// persists and returns a fresh one.
    ///
    /// # Contract
    /// - Unknown repository fails fast; neither store nor model is touched.
    /// - A populated field is returned as-is with origin `cached` and zero
    ///   model calls.
    /// - Concurrent misses for the same (repository, kind) coalesce into
    ///   one model call whose outcome every caller shares.
    pub fn generate_or_fetch(
        &self,
        repository_id: RepoId,
        kind: DiagramKind,
    ) -> DiagramServiceResult<DiagramAnswer> {
        let started_at = Instant::now();

        let repository = self
            .repositories
            .get_by_id(repository_id)?
            .ok_or(DiagramServiceError::RepositoryNotFound(repository_id))?;

        if let Some(record) = self.diagrams.find_by_repository_id(repository_id)? {
            if let Some(text) = record.script_for(kind) {
                info!(
                    "event=diagram_answer module=service status=cache_hit repository_id={repository_id} kind={kind} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(DiagramAnswer {
                    text: text.to_string(),
                    origin: AnswerOrigin::Cached,
                });
            }
        }

        let key = FlightKey {
            repository_id,
            kind,
        };
        let outcome = self
            .flights
            .join(key, || self.run_generation(&repository, kind))
            .into_inner();

        match outcome {
            Ok((text, origin)) => {
                info!(
                    "event=diagram_answer module=service status={origin} repository_id={repository_id} kind={kind} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(DiagramAnswer {
                    text: text.as_ref().to_string(),
                    origin,
                })
            }
            Err(err) => {
                error!(
                    "event=diagram_answer module=service status=error repository_id={repository_id} kind={kind} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Leader-side slow path: re-check, prompt, invoke, save the one
    /// generated field.
    ///
    /// Flights for other kinds of the same repository may run and save in
    /// parallel, so the write goes through the kind-scoped store operation
    /// rather than a read-modify-write of the whole record.
    fn run_generation(
        &self,
        repository: &Repository,
        kind: DiagramKind,
    ) -> DiagramServiceResult<FlightPayload> {
        // A previous flight may have filled the field between this caller's
        // miss and winning the election.
        if let Some(record) = self.diagrams.find_by_repository_id(repository.id)? {
            if let Some(text) = record.script_for(kind) {
                return Ok((Arc::from(text), AnswerOrigin::Cached));
            }
        }

        let messages = prompt::build_messages(kind, &repository.source_url);
        let raw = self.client.invoke(&self.model_id, &messages)?;
        let script = extract_diagram_script(&raw).ok_or_else(|| {
            DiagramServiceError::Generation(GenerationError::MalformedResponse(
                "completion contained no diagram script".to_string(),
            ))
        })?;

        self.diagrams.save_script(repository.id, kind, &script)?;

        Ok((Arc::from(script.as_str()), AnswerOrigin::Generated))
    }
}
