//! Storage boundary contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the lookup/store contracts consumed by the orchestrator.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Store errors are cloneable summaries: coalesced callers may share one
//!   failure outcome.
//! - SQLite implementations refuse connections whose schema version does
//!   not match this binary.

use crate::db::migrations::latest_version;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod diagram_store;
pub mod repository_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence-layer failure, reduced to cloneable form at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Driver or storage backend failure.
    Backend(String),
    /// Persisted state that violates model invariants.
    InvalidData(String),
    /// Connection whose schema does not match this binary.
    UninitializedSchema {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedSchema {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

/// Rejects connections that were not bootstrapped through `db::open_db`.
pub(crate) fn ensure_initialized(conn: &Connection) -> StoreResult<()> {
    let actual_version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(StoreError::UninitializedSchema {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
