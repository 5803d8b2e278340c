//! Per-user record bootstrap (get-or-create).
//!
//! # Responsibility
//! - Guarantee a user's record exists before the routine pipeline runs.
//!
//! # Invariants
//! - At most one write per user, performed on the first-ever call.
//! - Existing records are returned unchanged; they are never updated.
//! - A lost conditional-create race returns the winner's record.

use crate::model::record::{UserId, UserRecord};
use crate::repo::record_repo::{RecordStore, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum BootstrapError {
    /// Store unreachable or returned malformed data.
    Store(RepoError),
    /// Conditional create reported a conflict, but no record could be read back.
    InconsistentState(&'static str),
}

impl BootstrapError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.code(),
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "record store failed: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent record state: {details}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for BootstrapError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Outcome marker describing which branch the bootstrap took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapPath {
    Existing,
    Created,
    /// Another session created the record between our check and create.
    CreatedConcurrently,
}

impl BootstrapPath {
    fn as_str(self) -> &'static str {
        match self {
            Self::Existing => "existing",
            Self::Created => "created",
            Self::CreatedConcurrently => "created_concurrently",
        }
    }
}

pub struct RecordBootstrap<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> RecordBootstrap<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the user's record, creating the default one on first use.
    pub fn ensure_record(&self, user_id: &UserId) -> Result<UserRecord, BootstrapError> {
        self.ensure_record_with_path(user_id).map(|(record, _)| record)
    }

    /// Same as [`Self::ensure_record`], also reporting which branch was taken.
    pub fn ensure_record_with_path(
        &self,
        user_id: &UserId,
    ) -> Result<(UserRecord, BootstrapPath), BootstrapError> {
        let result = self.check_or_create(user_id);
        match &result {
            Ok((_, path)) => info!(
                "event=record_bootstrap module=service status=ok path={}",
                path.as_str()
            ),
            Err(err) => error!(
                "event=record_bootstrap module=service status=error error_code={} error={}",
                err.code(),
                err
            ),
        }
        result
    }

    fn check_or_create(
        &self,
        user_id: &UserId,
    ) -> Result<(UserRecord, BootstrapPath), BootstrapError> {
        if let Some(existing) = self.store.get_record(user_id)? {
            return Ok((existing, BootstrapPath::Existing));
        }

        let record = UserRecord::default_for(user_id.clone());
        if self.store.create_record_if_absent(&record)? {
            return Ok((record, BootstrapPath::Created));
        }

        let winner = self
            .store
            .get_record(user_id)?
            .ok_or(BootstrapError::InconsistentState(
                "conditional create conflicted but record is missing",
            ))?;
        Ok((winner, BootstrapPath::CreatedConcurrently))
    }
}
