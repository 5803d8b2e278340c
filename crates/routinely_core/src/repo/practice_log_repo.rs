//! Practice log persistence.
//!
//! # Invariants
//! - Entries are always listed in ascending `entry_id` order.
//! - Deletes are scoped to the owning user.

use crate::model::practice_log::{EntryId, NewPracticeLogEntry, PracticeLogEntry};
use crate::model::record::UserId;
use crate::repo::record_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    entry_id,
    user_id,
    session_index,
    notes,
    logged_at
FROM practice_log";

pub trait PracticeLogRepository {
    fn insert_entry(&self, entry: &NewPracticeLogEntry) -> RepoResult<PracticeLogEntry>;
    /// Lists a user's entries, optionally restricted to one session.
    fn list_entries(
        &self,
        user_id: &UserId,
        session_index: Option<u32>,
    ) -> RepoResult<Vec<PracticeLogEntry>>;
    /// Removes and returns one entry, or `NotFound` when the user has no such entry.
    fn delete_entry(&self, user_id: &UserId, entry_id: EntryId) -> RepoResult<PracticeLogEntry>;
}

pub struct SqlitePracticeLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePracticeLogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_entry(&self, user_id: &UserId, entry_id: EntryId) -> RepoResult<Option<PracticeLogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE user_id = ?1 AND entry_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id.as_str(), entry_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_entry_row(row)?)),
            None => Ok(None),
        }
    }
}

impl PracticeLogRepository for SqlitePracticeLogRepository<'_> {
    fn insert_entry(&self, entry: &NewPracticeLogEntry) -> RepoResult<PracticeLogEntry> {
        self.conn.execute(
            "INSERT INTO practice_log (user_id, session_index, notes, logged_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                entry.user_id.as_str(),
                entry.session_index,
                entry.notes.as_str(),
                entry.logged_at,
            ],
        )?;

        Ok(PracticeLogEntry {
            entry_id: self.conn.last_insert_rowid(),
            user_id: entry.user_id.clone(),
            session_index: entry.session_index,
            notes: entry.notes.clone(),
            logged_at: entry.logged_at,
        })
    }

    fn list_entries(
        &self,
        user_id: &UserId,
        session_index: Option<u32>,
    ) -> RepoResult<Vec<PracticeLogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE user_id = ?1
               AND (?2 IS NULL OR session_index = ?2)
             ORDER BY entry_id ASC;"
        ))?;

        let mut rows = stmt.query(params![user_id.as_str(), session_index])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn delete_entry(&self, user_id: &UserId, entry_id: EntryId) -> RepoResult<PracticeLogEntry> {
        let entry = self
            .get_entry(user_id, entry_id)?
            .ok_or_else(|| RepoError::NotFound(format!("practice log entry {entry_id}")))?;

        self.conn.execute(
            "DELETE FROM practice_log WHERE user_id = ?1 AND entry_id = ?2;",
            params![user_id.as_str(), entry_id],
        )?;
        Ok(entry)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<PracticeLogEntry> {
    let user_text: String = row.get("user_id")?;
    let user_id = UserId::parse(user_text)
        .map_err(|err| RepoError::InvalidData(format!("practice_log.user_id: {err}")))?;

    let session_value: i64 = row.get("session_index")?;
    let session_index = u32::try_from(session_value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid session_index `{session_value}` in practice_log.session_index"
        ))
    })?;

    Ok(PracticeLogEntry {
        entry_id: row.get("entry_id")?,
        user_id,
        session_index,
        notes: row.get("notes")?,
        logged_at: row.get("logged_at")?,
    })
}
