//! Keeps the last shown routine per user.
//!
//! # Responsibility
//! - Save the routine a pipeline task rendered, stamped with the config fingerprint.
//! - Hand back the saved plan only while it still matches the active config.
//!
//! # Invariants
//! - A plan saved under another fingerprint is reported as outdated, never reused.

use crate::model::record::UserId;
use crate::model::routine::Routine;
use crate::model::saved_plan::SavedPlan;
use crate::repo::plan_repo::PlanStore;
use crate::repo::record_repo::RepoError;
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SavedPlanError {
    Missing(UserId),
    Outdated(UserId),
    Repo(RepoError),
}

impl SavedPlanError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "plan_missing",
            Self::Outdated(_) => "plan_outdated",
            Self::Repo(err) => err.code(),
        }
    }
}

impl Display for SavedPlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(user_id) => write!(
                f,
                "no saved plan for `{user_id}`; show or export a routine before logging"
            ),
            Self::Outdated(user_id) => write!(
                f,
                "configuration has changed since the plan for `{user_id}` was saved; \
                 show or export a routine again before logging"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SavedPlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SavedPlanError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct PlanService<P: PlanStore> {
    store: P,
    fingerprint: String,
}

impl<P: PlanStore> PlanService<P> {
    /// `fingerprint` identifies the active topic and planner settings.
    pub fn new(store: P, fingerprint: impl Into<String>) -> Self {
        Self {
            store,
            fingerprint: fingerprint.into(),
        }
    }

    pub fn save_shown(
        &self,
        user_id: &UserId,
        routine: &Routine,
    ) -> Result<SavedPlan, SavedPlanError> {
        self.save_shown_at(user_id, routine, Utc::now().timestamp_millis())
    }

    pub fn save_shown_at(
        &self,
        user_id: &UserId,
        routine: &Routine,
        saved_at: i64,
    ) -> Result<SavedPlan, SavedPlanError> {
        let plan = SavedPlan {
            user_id: user_id.clone(),
            routine: routine.clone(),
            config_fingerprint: self.fingerprint.clone(),
            saved_at,
        };
        self.store.save_plan(&plan)?;
        info!(
            "event=plan_save module=service status=ok sessions={}",
            plan.session_count()
        );
        Ok(plan)
    }

    /// Returns the user's saved plan if it was built from the active settings.
    pub fn current_plan(&self, user_id: &UserId) -> Result<SavedPlan, SavedPlanError> {
        let plan = self
            .store
            .load_plan(user_id)?
            .ok_or_else(|| SavedPlanError::Missing(user_id.clone()))?;
        if plan.config_fingerprint != self.fingerprint {
            return Err(SavedPlanError::Outdated(user_id.clone()));
        }
        Ok(plan)
    }
}
