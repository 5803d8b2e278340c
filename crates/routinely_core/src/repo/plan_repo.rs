//! Saved plan persistence, one row per user.
//!
//! # Invariants
//! - Saving replaces the user's previous plan.
//! - A stored `session_count` always matches the stored routine length.

use crate::model::record::UserId;
use crate::model::routine::Routine;
use crate::model::saved_plan::SavedPlan;
use crate::repo::record_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

pub trait PlanStore {
    fn save_plan(&self, plan: &SavedPlan) -> RepoResult<()>;
    fn load_plan(&self, user_id: &UserId) -> RepoResult<Option<SavedPlan>>;
}

impl<T: PlanStore + ?Sized> PlanStore for &T {
    fn save_plan(&self, plan: &SavedPlan) -> RepoResult<()> {
        (**self).save_plan(plan)
    }

    fn load_plan(&self, user_id: &UserId) -> RepoResult<Option<SavedPlan>> {
        (**self).load_plan(user_id)
    }
}

pub struct SqlitePlanStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlanStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PlanStore for SqlitePlanStore<'_> {
    fn save_plan(&self, plan: &SavedPlan) -> RepoResult<()> {
        let routine = serde_json::to_string(&plan.routine)
            .map_err(|err| RepoError::InvalidData(format!("saved_plans.routine: {err}")))?;
        self.conn.execute(
            "INSERT INTO saved_plans (user_id, session_count, config_fingerprint, routine, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                session_count = excluded.session_count,
                config_fingerprint = excluded.config_fingerprint,
                routine = excluded.routine,
                saved_at = excluded.saved_at;",
            params![
                plan.user_id.as_str(),
                plan.session_count(),
                plan.config_fingerprint.as_str(),
                routine,
                plan.saved_at,
            ],
        )?;
        Ok(())
    }

    fn load_plan(&self, user_id: &UserId) -> RepoResult<Option<SavedPlan>> {
        let row = self
            .conn
            .query_row(
                "SELECT session_count, config_fingerprint, routine, saved_at
                 FROM saved_plans WHERE user_id = ?1;",
                params![user_id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((session_count, config_fingerprint, routine_json, saved_at)) = row else {
            return Ok(None);
        };
        let routine: Routine = serde_json::from_str(&routine_json)
            .map_err(|err| RepoError::InvalidData(format!("saved_plans.routine: {err}")))?;
        if usize::try_from(session_count).ok() != Some(routine.len()) {
            return Err(RepoError::InvalidData(format!(
                "saved_plans.session_count {session_count} does not match {} stored days",
                routine.len()
            )));
        }

        Ok(Some(SavedPlan {
            user_id: user_id.clone(),
            routine,
            config_fingerprint,
            saved_at,
        }))
    }
}
