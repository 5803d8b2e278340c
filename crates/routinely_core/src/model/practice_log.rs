//! Practice log entry model.
//!
//! # Invariants
//! - `notes` is non-empty after trimming.
//! - `session_index` is zero-based and refers to a day of the current plan.
//! - `entry_id` is assigned by storage and never reused.

use crate::model::record::UserId;
use serde::{Deserialize, Serialize};

/// Storage-assigned entry identifier.
pub type EntryId = i64;

/// One note logged against a practice session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeLogEntry {
    pub entry_id: EntryId,
    pub user_id: UserId,
    pub session_index: u32,
    pub notes: String,
    /// Unix epoch milliseconds.
    pub logged_at: i64,
}

/// Input for a new log entry before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPracticeLogEntry {
    pub user_id: UserId,
    pub session_index: u32,
    pub notes: String,
    pub logged_at: i64,
}
