//! Repository lookup contract and SQLite implementation.
//!
//! # Responsibility
//! - Resolve repository identity records by external id.
//! - Keep repository SQL inside the store boundary.
//!
//! # Invariants
//! - Lookup never creates or mutates repository rows; `insert` exists only
//!   for seeding.

use crate::model::repository::{RepoId, Repository};
use crate::store::{ensure_initialized, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Boundary abstraction over the external repository catalog.
pub trait RepositoryLookup {
    fn get_by_id(&self, id: RepoId) -> StoreResult<Option<Repository>>;
}

/// SQLite-backed repository lookup.
pub struct SqliteRepositoryStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositoryStore<'conn> {
    /// Wraps a bootstrapped connection, rejecting unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_initialized(conn)?;
        Ok(Self { conn })
    }

    /// Seeds one repository row. CLI/test helper, not part of the lookup
    /// contract.
    pub fn insert(&self, repository: &Repository) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO repositories (id, source_url) VALUES (?1, ?2);",
            params![repository.id, repository.source_url],
        )?;
        Ok(())
    }
}

impl RepositoryLookup for SqliteRepositoryStore<'_> {
    fn get_by_id(&self, id: RepoId) -> StoreResult<Option<Repository>> {
        let repository = self
            .conn
            .query_row(
                "SELECT id, source_url FROM repositories WHERE id = ?1;",
                params![id],
                |row| {
                    Ok(Repository {
                        id: row.get(0)?,
                        source_url: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(repository)
    }
}
