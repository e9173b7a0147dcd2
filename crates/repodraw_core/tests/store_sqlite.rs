use repodraw_core::db::migrations::latest_version;
use repodraw_core::db::{open_db, open_db_in_memory};
use repodraw_core::{
    DiagramKind, DiagramStore, Repository, RepositoryLookup, SqliteDiagramStore,
    SqliteRepositoryStore, StoreError,
};
use rusqlite::Connection;

fn diagram_row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM diagrams;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn repository_insert_and_lookup_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRepositoryStore::try_new(&conn).unwrap();

    let repository = Repository::new(42, "https://github.com/acme/widgets");
    store.insert(&repository).unwrap();

    let loaded = store.get_by_id(42).unwrap().unwrap();
    assert_eq!(loaded, repository);
    assert!(store.get_by_id(999).unwrap().is_none());
}

#[test]
fn save_after_empty_find_creates_exactly_one_row_under_retry() {
    let conn = open_db_in_memory().unwrap();
    let repositories = SqliteRepositoryStore::try_new(&conn).unwrap();
    repositories
        .insert(&Repository::new(1, "https://github.com/acme/widgets"))
        .unwrap();
    let diagrams = SqliteDiagramStore::try_new(&conn).unwrap();

    assert!(diagrams.find_by_repository_id(1).unwrap().is_none());

    let script = "classDiagram\n    A --> B";
    diagrams.save_script(1, DiagramKind::Class, script).unwrap();
    // Retried save of the same script must not create a duplicate.
    diagrams.save_script(1, DiagramKind::Class, script).unwrap();

    assert_eq!(diagram_row_count(&conn), 1);
}

#[test]
fn saving_one_kind_leaves_other_columns_intact() {
    let conn = open_db_in_memory().unwrap();
    let repositories = SqliteRepositoryStore::try_new(&conn).unwrap();
    repositories
        .insert(&Repository::new(1, "https://github.com/acme/widgets"))
        .unwrap();
    let diagrams = SqliteDiagramStore::try_new(&conn).unwrap();

    diagrams
        .save_script(1, DiagramKind::Class, "classDiagram\n    A --> B")
        .unwrap();
    diagrams
        .save_script(1, DiagramKind::Sequence, "sequenceDiagram\n    A->>B: ping")
        .unwrap();

    assert_eq!(diagram_row_count(&conn), 1);
    let merged = diagrams.find_by_repository_id(1).unwrap().unwrap();
    assert_eq!(merged.class_script.as_deref(), Some("classDiagram\n    A --> B"));
    assert!(merged.sequence_script.is_some());
    assert!(merged.erd_script.is_none());
}

#[test]
fn kind_fields_persist_independently() {
    let conn = open_db_in_memory().unwrap();
    let repositories = SqliteRepositoryStore::try_new(&conn).unwrap();
    repositories
        .insert(&Repository::new(1, "https://github.com/acme/widgets"))
        .unwrap();
    let diagrams = SqliteDiagramStore::try_new(&conn).unwrap();

    for kind in DiagramKind::ALL {
        diagrams
            .save_script(1, kind, &format!("{} body", kind.spec().notation))
            .unwrap();
    }

    let record = diagrams.find_by_repository_id(1).unwrap().unwrap();
    for kind in DiagramKind::ALL {
        let script = record.script_for(kind).expect("every kind should be stored");
        assert!(script.starts_with(kind.spec().notation));
    }
    assert_eq!(diagram_row_count(&conn), 1);
}

#[test]
fn saving_diagram_for_missing_repository_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let diagrams = SqliteDiagramStore::try_new(&conn).unwrap();

    let err = diagrams
        .save_script(404, DiagramKind::Class, "classDiagram\n    A --> B")
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
}

#[test]
fn file_backed_db_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repodraw.db");

    {
        let conn = open_db(&path).unwrap();
        let repositories = SqliteRepositoryStore::try_new(&conn).unwrap();
        repositories
            .insert(&Repository::new(5, "https://github.com/acme/bolts"))
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repositories = SqliteRepositoryStore::try_new(&conn).unwrap();
    let loaded = repositories.get_by_id(5).unwrap().unwrap();
    assert_eq!(loaded.source_url, "https://github.com/acme/bolts");
}

#[test]
fn stores_reject_uninitialized_connections() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteDiagramStore::try_new(&conn)
        .err()
        .expect("unmigrated connection must be rejected");
    match err {
        StoreError::UninitializedSchema {
            expected_version,
            actual_version: 0,
        } => assert_eq!(expected_version, latest_version()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        SqliteRepositoryStore::try_new(&conn),
        Err(StoreError::UninitializedSchema { .. })
    ));
}
