use routinely_core::db::migrations::latest_version;
use routinely_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection};

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn document_path_is_unique_so_conditional_insert_keeps_first_writer() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO documents (path, collection, data) VALUES (?1, 'routines', ?2)
                  ON CONFLICT(path) DO NOTHING;";

    let first = conn.execute(insert, params!["routines/u", r#"{"who":"first"}"#]).unwrap();
    let second = conn.execute(insert, params!["routines/u", r#"{"who":"second"}"#]).unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 0);
    let data: String = conn
        .query_row("SELECT data FROM documents WHERE path = 'routines/u';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(data, r#"{"who":"first"}"#);

    let plain = conn.execute(
        "INSERT INTO documents (path, collection, data) VALUES ('routines/u', 'routines', '{}');",
        [],
    );
    assert!(plain.is_err());
}

#[test]
fn documents_get_a_millisecond_creation_stamp() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (path, collection, data) VALUES ('routines/t', 'routines', '{}');",
        [],
    )
    .unwrap();

    let created_at: i64 = conn
        .query_row("SELECT created_at FROM documents;", [], |row| row.get(0))
        .unwrap();
    // 2020-01-01 in milliseconds; a seconds value would be far smaller.
    assert!(created_at > 1_577_836_800_000);
}

#[test]
fn practice_log_rejects_blank_notes_and_negative_sessions() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO practice_log (user_id, session_index, notes, logged_at)
                  VALUES (?1, ?2, ?3, 0);";

    assert!(conn.execute(insert, params!["u", 0, "   "]).is_err());
    assert!(conn.execute(insert, params!["u", -1, "scales"]).is_err());
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM practice_log;"), 0);

    conn.execute(insert, params!["u", 0, "scales"]).unwrap();
    conn.execute(insert, params!["u", 0, "chords"]).unwrap();
    let ids: Vec<i64> = conn
        .prepare("SELECT entry_id FROM practice_log ORDER BY entry_id;")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn saved_plans_keep_one_row_per_user_and_reject_negative_counts() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO saved_plans (user_id, session_count, config_fingerprint, routine, saved_at)
                  VALUES (?1, ?2, 'abc', '{\"days\":[]}', 0);";

    assert!(conn.execute(insert, params!["u", -1]).is_err());
    conn.execute(insert, params!["u", 0]).unwrap();
    assert!(conn.execute(insert, params!["u", 5]).is_err());
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM saved_plans;"), 1);
}

#[test]
fn reopening_a_store_keeps_rows_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routinely.db");

    {
        let conn = open_db(&path).unwrap();
        assert_eq!(user_version(&conn), latest_version());
        conn.execute(
            "INSERT INTO practice_log (user_id, session_index, notes, logged_at) VALUES ('u', 1, 'tempo', 5);",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM practice_log;"), 1);
}

#[test]
fn store_from_a_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "db_schema_unsupported");
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            latest_supported,
        } if latest_supported == latest_version()
    ));

    let untouched = Connection::open(&path).unwrap();
    assert_eq!(user_version(&untouched), 999);
    assert_eq!(
        count(&untouched, "SELECT COUNT(*) FROM sqlite_master WHERE name = 'documents';"),
        0
    );
}
