//! Persisted user record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide keyed get / conditional-create / overwrite over `documents`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Records live at `routines/{user_id}` in the `routines` collection.
//! - `create_record_if_absent` never overwrites an existing document.
//! - Read paths reject malformed persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::record::{UserId, UserRecord, RECORD_COLLECTION};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by record and practice log persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(String),
    InvalidData(String),
}

impl RepoError {
    /// Stable metadata-only code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(err) => err.code(),
            Self::NotFound(_) => "not_found",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Keyed document store holding one record per user.
pub trait RecordStore {
    fn get_record(&self, user_id: &UserId) -> RepoResult<Option<UserRecord>>;
    /// Writes `record` only when no document exists at its key.
    ///
    /// Returns `true` when this call performed the write.
    fn create_record_if_absent(&self, record: &UserRecord) -> RepoResult<bool>;
    /// Creates or overwrites the document at the record's key.
    fn set_record(&self, record: &UserRecord) -> RepoResult<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn get_record(&self, user_id: &UserId) -> RepoResult<Option<UserRecord>> {
        (**self).get_record(user_id)
    }

    fn create_record_if_absent(&self, record: &UserRecord) -> RepoResult<bool> {
        (**self).create_record_if_absent(record)
    }

    fn set_record(&self, record: &UserRecord) -> RepoResult<()> {
        (**self).set_record(record)
    }
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn get_record(&self, user_id: &UserId) -> RepoResult<Option<UserRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT path, data FROM documents WHERE path = ?1;",
                [user_id.record_key()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(path, data)| parse_record(&path, &data)).transpose()
    }

    fn create_record_if_absent(&self, record: &UserRecord) -> RepoResult<bool> {
        let data = encode_data(&record.data)?;
        let changed = self.conn.execute(
            "INSERT INTO documents (path, collection, data)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(path) DO NOTHING;",
            params![record.key(), RECORD_COLLECTION, data],
        )?;
        Ok(changed == 1)
    }

    fn set_record(&self, record: &UserRecord) -> RepoResult<()> {
        let data = encode_data(&record.data)?;
        self.conn.execute(
            "INSERT INTO documents (path, collection, data)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(path) DO UPDATE SET data = excluded.data;",
            params![record.key(), RECORD_COLLECTION, data],
        )?;
        Ok(())
    }
}

fn encode_data(data: &Map<String, Value>) -> RepoResult<String> {
    serde_json::to_string(data)
        .map_err(|err| RepoError::InvalidData(format!("record data is not serializable: {err}")))
}

fn parse_record(path: &str, data: &str) -> RepoResult<UserRecord> {
    let raw_id = path
        .strip_prefix(RECORD_COLLECTION)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| {
            RepoError::InvalidData(format!("document path `{path}` is outside `{RECORD_COLLECTION}`"))
        })?;
    let user_id = UserId::parse(raw_id)
        .map_err(|err| RepoError::InvalidData(format!("documents.path: {err}")))?;

    let data = serde_json::from_str::<Map<String, Value>>(data).map_err(|err| {
        RepoError::InvalidData(format!("documents.data for `{path}` is not a JSON object: {err}"))
    })?;

    Ok(UserRecord { user_id, data })
}
