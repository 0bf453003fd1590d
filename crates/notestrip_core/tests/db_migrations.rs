use notestrip_core::db::migrations::{apply_migrations, latest_version};
use notestrip_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn item_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(items);").unwrap();
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    columns
}

#[test]
fn fresh_store_has_items_schema_at_latest_version() {
    let conn = open_db_in_memory().unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert_eq!(
        item_columns(&conn),
        vec!["seq", "id", "timestamp", "note", "is_deleted", "updated_at"]
    );

    let index_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'index' AND name = 'idx_items_strip_order';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(index_count, 1);
}

#[test]
fn rerunning_migrations_keeps_rows_and_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notestrip.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        conn.execute_batch(
            "INSERT INTO items (id, timestamp) VALUES ('11111111-2222-4333-8444-555555555555', 1);
             INSERT INTO items (id, timestamp) VALUES ('22222222-2222-4333-8444-555555555555', 2);
             DELETE FROM items WHERE timestamp = 2;",
        )
        .unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    apply_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO items (id, timestamp) VALUES ('33333333-2222-4333-8444-555555555555', 3);",
        [],
    )
    .unwrap();
    let seqs: Vec<i64> = conn
        .prepare("SELECT seq FROM items ORDER BY seq;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(seqs, vec![1, 3]);
}

#[test]
fn schema_rejects_out_of_range_tombstone_flag() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO items (id, timestamp, is_deleted)
             VALUES ('11111111-2222-4333-8444-555555555555', 1, 2);",
            [],
        )
        .unwrap_err();
    assert!(DbError::from(err).is_constraint_violation());
}

#[test]
fn store_written_by_newer_binary_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, latest_version() + 1);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}
