use routinely_core::db::{open_db, open_db_in_memory};
use routinely_core::{
    BootstrapError, BootstrapPath, RecordBootstrap, RecordStore, RepoError, RepoResult,
    SqliteRecordStore, UserId, UserRecord,
};
use serde_json::Value;
use std::cell::Cell;

/// Wraps a store and counts write calls.
struct CountingStore<S> {
    inner: S,
    creates: Cell<usize>,
    sets: Cell<usize>,
}

impl<S: RecordStore> CountingStore<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            creates: Cell::new(0),
            sets: Cell::new(0),
        }
    }
}

impl<S: RecordStore> RecordStore for CountingStore<S> {
    fn get_record(&self, user_id: &UserId) -> RepoResult<Option<UserRecord>> {
        self.inner.get_record(user_id)
    }

    fn create_record_if_absent(&self, record: &UserRecord) -> RepoResult<bool> {
        self.creates.set(self.creates.get() + 1);
        self.inner.create_record_if_absent(record)
    }

    fn set_record(&self, record: &UserRecord) -> RepoResult<()> {
        self.sets.set(self.sets.get() + 1);
        self.inner.set_record(record)
    }
}

/// Simulates another session creating the record between check and create.
struct RacingStore<'conn> {
    inner: SqliteRecordStore<'conn>,
    rival_data: UserRecord,
}

impl RecordStore for RacingStore<'_> {
    fn get_record(&self, user_id: &UserId) -> RepoResult<Option<UserRecord>> {
        self.inner.get_record(user_id)
    }

    fn create_record_if_absent(&self, record: &UserRecord) -> RepoResult<bool> {
        self.inner.create_record_if_absent(&self.rival_data)?;
        self.inner.create_record_if_absent(record)
    }

    fn set_record(&self, record: &UserRecord) -> RepoResult<()> {
        self.inner.set_record(record)
    }
}

struct UnreachableStore;

impl RecordStore for UnreachableStore {
    fn get_record(&self, _user_id: &UserId) -> RepoResult<Option<UserRecord>> {
        Err(RepoError::Db(routinely_core::db::DbError::Sqlite(
            rusqlite::Error::InvalidQuery,
        )))
    }

    fn create_record_if_absent(&self, _record: &UserRecord) -> RepoResult<bool> {
        unreachable!("bootstrap must not write after a failed read")
    }

    fn set_record(&self, _record: &UserRecord) -> RepoResult<()> {
        unreachable!("bootstrap never overwrites")
    }
}

fn user(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

#[test]
fn ensure_record_twice_creates_exactly_once() {
    let conn = open_db_in_memory().unwrap();
    let store = CountingStore::new(SqliteRecordStore::new(&conn));
    let bootstrap = RecordBootstrap::new(&store);

    let (first, first_path) = bootstrap.ensure_record_with_path(&user("u-1")).unwrap();
    let (second, second_path) = bootstrap.ensure_record_with_path(&user("u-1")).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_path, BootstrapPath::Created);
    assert_eq!(second_path, BootstrapPath::Existing);
    assert_eq!(store.creates.get(), 1);
    assert_eq!(store.sets.get(), 0);
}

#[test]
fn created_record_is_stored_under_routines_key() {
    let conn = open_db_in_memory().unwrap();
    let bootstrap = RecordBootstrap::new(SqliteRecordStore::new(&conn));

    let record = bootstrap.ensure_record(&user("abc")).unwrap();
    assert!(record.data.contains_key("message"));

    let (path, collection): (String, String) = conn
        .query_row("SELECT path, collection FROM documents;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!(path, "routines/abc");
    assert_eq!(collection, "routines");
}

#[test]
fn existing_record_is_returned_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let mut custom = UserRecord::default_for(user("returning"));
    custom
        .data
        .insert("plan".to_string(), Value::String("weekly".to_string()));
    store.set_record(&custom).unwrap();

    let counting = CountingStore::new(&store);
    let loaded = RecordBootstrap::new(&counting)
        .ensure_record(&user("returning"))
        .unwrap();

    assert_eq!(loaded, custom);
    assert_eq!(counting.creates.get(), 0);
}

#[test]
fn records_are_isolated_per_user() {
    let conn = open_db_in_memory().unwrap();
    let bootstrap = RecordBootstrap::new(SqliteRecordStore::new(&conn));

    let alice = bootstrap.ensure_record(&user("alice")).unwrap();
    let bob = bootstrap.ensure_record(&user("bob")).unwrap();

    assert_eq!(alice.user_id.as_str(), "alice");
    assert_eq!(bob.user_id.as_str(), "bob");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn losing_a_create_race_returns_the_winner_record() {
    let conn = open_db_in_memory().unwrap();
    let mut rival = UserRecord::default_for(user("raced"));
    rival
        .data
        .insert("session".to_string(), Value::String("other".to_string()));
    let store = RacingStore {
        inner: SqliteRecordStore::new(&conn),
        rival_data: rival.clone(),
    };

    let (record, path) = RecordBootstrap::new(store)
        .ensure_record_with_path(&user("raced"))
        .unwrap();

    assert_eq!(path, BootstrapPath::CreatedConcurrently);
    assert_eq!(record, rival);
}

#[test]
fn record_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routinely.db");

    let created = {
        let conn = open_db(&path).unwrap();
        RecordBootstrap::new(SqliteRecordStore::new(&conn))
            .ensure_record(&user("persisted"))
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    let (reloaded, bootstrap_path) = RecordBootstrap::new(SqliteRecordStore::new(&conn))
        .ensure_record_with_path(&user("persisted"))
        .unwrap();
    assert_eq!(reloaded, created);
    assert_eq!(bootstrap_path, BootstrapPath::Existing);
}

#[test]
fn store_failure_surfaces_as_bootstrap_error() {
    let err = RecordBootstrap::new(UnreachableStore)
        .ensure_record(&user("offline"))
        .unwrap_err();
    assert!(matches!(err, BootstrapError::Store(RepoError::Db(_))));
}

#[test]
fn malformed_persisted_data_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (path, collection, data) VALUES ('routines/broken', 'routines', '[1,2]');",
        [],
    )
    .unwrap();

    let err = SqliteRecordStore::new(&conn)
        .get_record(&user("broken"))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
