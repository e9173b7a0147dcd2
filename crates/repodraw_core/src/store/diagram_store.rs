//! Diagram record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Fetch the per-repository diagram record and persist per-kind scripts.
//! - Guarantee one row per repository id under retried saves.
//!
//! # Invariants
//! - `save_script` is an upsert keyed on `repository_id` that touches only
//!   the named kind's column: concurrent saves for different kinds of the
//!   same repository never overwrite each other.
//! - Rows are never deleted by core.

use crate::model::diagram::{DiagramKind, DiagramRecord};
use crate::model::repository::RepoId;
use crate::store::{ensure_initialized, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Boundary abstraction over diagram record persistence.
pub trait DiagramStore {
    fn find_by_repository_id(&self, repository_id: RepoId) -> StoreResult<Option<DiagramRecord>>;

    /// Persists one kind's script without disturbing the other kinds.
    fn save_script(
        &self,
        repository_id: RepoId,
        kind: DiagramKind,
        script: &str,
    ) -> StoreResult<()>;
}

/// SQLite-backed diagram store.
pub struct SqliteDiagramStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDiagramStore<'conn> {
    /// Wraps a bootstrapped connection, rejecting unmigrated ones.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_initialized(conn)?;
        Ok(Self { conn })
    }
}

fn script_column(kind: DiagramKind) -> &'static str {
    match kind {
        DiagramKind::Class => "class_script",
        DiagramKind::Sequence => "sequence_script",
        DiagramKind::Erd => "erd_script",
    }
}

impl DiagramStore for SqliteDiagramStore<'_> {
    fn find_by_repository_id(&self, repository_id: RepoId) -> StoreResult<Option<DiagramRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT repository_id, class_script, sequence_script, erd_script
                 FROM diagrams
                 WHERE repository_id = ?1;",
                params![repository_id],
                |row| {
                    Ok(DiagramRecord {
                        repository_id: row.get(0)?,
                        class_script: row.get(1)?,
                        sequence_script: row.get(2)?,
                        erd_script: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn save_script(
        &self,
        repository_id: RepoId,
        kind: DiagramKind,
        script: &str,
    ) -> StoreResult<()> {
        let column = script_column(kind);
        self.conn.execute(
            &format!(
                "INSERT INTO diagrams (repository_id, {column})
                 VALUES (?1, ?2)
                 ON CONFLICT(repository_id) DO UPDATE SET
                    {column} = excluded.{column},
                    updated_at = (strftime('%s', 'now') * 1000);"
            ),
            params![repository_id, script],
        )?;
        Ok(())
    }
}
