//! Practice log use-case service.
//!
//! # Responsibility
//! - Attach free-form notes to sessions (days) of the user's saved plan.
//!
//! # Invariants
//! - Notes are trimmed and must not be empty.
//! - Session numbers refer to the plan the user was last shown; without a
//!   current saved plan nothing can be logged against a session.

use crate::model::practice_log::{EntryId, NewPracticeLogEntry, PracticeLogEntry};
use crate::model::record::UserId;
use crate::repo::plan_repo::PlanStore;
use crate::repo::practice_log_repo::PracticeLogRepository;
use crate::repo::record_repo::RepoError;
use crate::service::plan_service::{PlanService, SavedPlanError};
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum PracticeLogError {
    EmptyNotes,
    SessionOutOfRange { session_index: u32, session_count: u32 },
    EntryNotFound(EntryId),
    Plan(SavedPlanError),
    Repo(RepoError),
}

impl Display for PracticeLogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNotes => write!(f, "notes cannot be empty"),
            Self::SessionOutOfRange {
                session_count: 0, ..
            } => write!(f, "the saved plan has no sessions"),
            Self::SessionOutOfRange {
                session_index,
                session_count,
            } => write!(
                f,
                "session {} is outside the plan; expected 1..={session_count}",
                u64::from(*session_index) + 1
            ),
            Self::EntryNotFound(entry_id) => write!(f, "no log entry with id {entry_id}"),
            Self::Plan(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PracticeLogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Plan(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SavedPlanError> for PracticeLogError {
    fn from(value: SavedPlanError) -> Self {
        Self::Plan(value)
    }
}

impl From<RepoError> for PracticeLogError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct PracticeLogService<R: PracticeLogRepository, P: PlanStore> {
    repo: R,
    plans: PlanService<P>,
}

impl<R: PracticeLogRepository, P: PlanStore> PracticeLogService<R, P> {
    pub fn new(repo: R, plans: PlanService<P>) -> Self {
        Self { repo, plans }
    }

    /// Logs a note against a session, timestamped now.
    pub fn add_entry(
        &self,
        user_id: &UserId,
        session_index: u32,
        notes: &str,
    ) -> Result<PracticeLogEntry, PracticeLogError> {
        self.add_entry_at(user_id, session_index, notes, Utc::now().timestamp_millis())
    }

    pub fn add_entry_at(
        &self,
        user_id: &UserId,
        session_index: u32,
        notes: &str,
        logged_at: i64,
    ) -> Result<PracticeLogEntry, PracticeLogError> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(PracticeLogError::EmptyNotes);
        }
        self.check_session(user_id, session_index)?;

        let entry = self.repo.insert_entry(&NewPracticeLogEntry {
            user_id: user_id.clone(),
            session_index,
            notes: notes.to_string(),
            logged_at,
        })?;
        info!(
            "event=practice_log_add module=service status=ok entry_id={} session_index={} notes_chars={}",
            entry.entry_id,
            entry.session_index,
            entry.notes.chars().count()
        );
        Ok(entry)
    }

    pub fn list_entries(
        &self,
        user_id: &UserId,
        session_index: Option<u32>,
    ) -> Result<Vec<PracticeLogEntry>, PracticeLogError> {
        if let Some(index) = session_index {
            self.check_session(user_id, index)?;
        }
        Ok(self.repo.list_entries(user_id, session_index)?)
    }

    pub fn delete_entry(
        &self,
        user_id: &UserId,
        entry_id: EntryId,
    ) -> Result<PracticeLogEntry, PracticeLogError> {
        let removed = self
            .repo
            .delete_entry(user_id, entry_id)
            .map_err(|err| match err {
                RepoError::NotFound(_) => PracticeLogError::EntryNotFound(entry_id),
                other => PracticeLogError::Repo(other),
            })?;
        info!(
            "event=practice_log_delete module=service status=ok entry_id={}",
            removed.entry_id
        );
        Ok(removed)
    }

    fn check_session(&self, user_id: &UserId, session_index: u32) -> Result<(), PracticeLogError> {
        let session_count = self.plans.current_plan(user_id)?.session_count();
        if session_index >= session_count {
            return Err(PracticeLogError::SessionOutOfRange {
                session_index,
                session_count,
            });
        }
        Ok(())
    }
}
