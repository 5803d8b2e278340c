//! Core domain logic for Routinely.
//! This crate is the single source of truth for scheduling invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod repo;
pub mod schedule;
pub mod service;

pub use config::{AppConfig, ConfigError, EngineKind};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::practice_log::{EntryId, PracticeLogEntry};
pub use model::record::{InvalidUserId, UserId, UserRecord};
pub use model::routine::{Routine, RoutineDay};
pub use model::saved_plan::SavedPlan;
pub use model::topic::{CatalogError, OutOfRangeError, Topic, TopicCatalog, TopicIndex};
pub use pipeline::{
    AppContext, AuthState, GenerationGate, Identity, IdentityProvider, PipelineError,
    SignInError, StaticIdentity, TaskOutcome, TaskTicket,
};
pub use render::{format_markdown, render_routine, NestedList, RenderTarget};
pub use repo::plan_repo::{PlanStore, SqlitePlanStore};
pub use repo::practice_log_repo::{PracticeLogRepository, SqlitePracticeLogRepository};
pub use repo::record_repo::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
pub use schedule::assembler::{assemble, AssembleError};
pub use schedule::dates::{sequence, DateSequence};
pub use schedule::generator::{
    parse_payload, BuiltinEngine, CommandEngine, ConfiguredEngine, EngineError, EngineGenerator,
    GeneratorError, GeneratorOutput, RoutineEngine, ScheduleGenerator,
};
pub use schedule::planner::{PlanError, Planner, PlannerSettings};
pub use service::bootstrap_service::{BootstrapError, BootstrapPath, RecordBootstrap};
pub use service::plan_service::{PlanService, SavedPlanError};
pub use service::practice_log_service::{PracticeLogError, PracticeLogService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
