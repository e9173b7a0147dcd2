//! Generation boundary: chat messages, client contract, failure taxonomy.
//!
//! # Responsibility
//! - Define the kind-agnostic text-completion contract used by the
//!   orchestrator.
//! - Classify generation failures precisely enough for callers to tell
//!   upstream-unavailable apart from bad payloads.
//!
//! # Invariants
//! - Errors are cloneable summaries: coalesced callers may share one
//!   failure outcome.
//! - Nothing in this module knows about diagram kinds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod extract;
pub mod openai;

pub use extract::extract_diagram_script;
pub use openai::{OpenAiClient, OpenAiConfig};

/// Speaker role in a chat-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One ordered message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Builds a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Builds a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Failure taxonomy for one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Network/connection level failure.
    Transport(String),
    /// Non-success response code from the remote service.
    Status { code: u16, body: String },
    /// Unparsable or empty completion payload.
    MalformedResponse(String),
    /// No completion within the configured bound.
    Timeout(String),
}

impl Display for GenerationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::Status { code, body } => write!(f, "unexpected status {code}: {body}"),
            Self::MalformedResponse(message) => write!(f, "malformed completion: {message}"),
            Self::Timeout(message) => write!(f, "generation timed out: {message}"),
        }
    }
}

impl Error for GenerationError {}

/// Boundary abstraction over the external generative model.
///
/// # Contract
/// - One call issues at most one completion request.
/// - Implementations must bound the request with an explicit timeout and
///   report it as `GenerationError::Timeout`.
/// - No retry policy here; callers decide whether to try again.
pub trait GenerationClient {
    fn invoke(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<String, GenerationError>;
}
