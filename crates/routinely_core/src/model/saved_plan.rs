//! The routine a user was last shown.
//!
//! Practice log sessions are numbered against this plan, so it outlives the
//! pipeline task that produced it.

use crate::model::record::UserId;
use crate::model::routine::Routine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPlan {
    pub user_id: UserId,
    pub routine: Routine,
    /// Fingerprint of the settings that decide what a session contains.
    pub config_fingerprint: String,
    /// Unix epoch milliseconds.
    pub saved_at: i64,
}

impl SavedPlan {
    pub fn session_count(&self) -> u32 {
        u32::try_from(self.routine.len()).unwrap_or(u32::MAX)
    }
}
