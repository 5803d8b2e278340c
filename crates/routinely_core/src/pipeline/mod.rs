//! Routine pipeline task and application context.
//!
//! # Responsibility
//! - Run one authenticated-user task: bootstrap, generate, assemble, render.
//! - Hold every collaborator explicitly so isolated instances can coexist.
//!
//! # Invariants
//! - Steps run strictly in order; the first failure aborts the task.
//! - The render target is touched only after a full routine is assembled.
//! - A task superseded by a newer generation never renders.

mod generation;
mod identity;

pub use generation::{GenerationGate, TaskTicket};
pub use identity::{AuthState, Identity, IdentityProvider, SignInError, StaticIdentity};

use crate::model::record::{UserId, UserRecord};
use crate::model::routine::Routine;
use crate::model::topic::{OutOfRangeError, TopicCatalog};
use crate::render::{render_routine, RenderTarget};
use crate::repo::record_repo::RecordStore;
use crate::schedule::assembler::{assemble, AssembleError};
use crate::schedule::generator::{GeneratorError, ScheduleGenerator};
use crate::service::bootstrap_service::{BootstrapError, RecordBootstrap};
use chrono::NaiveDate;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug)]
pub enum PipelineError {
    SignInFailed(SignInError),
    Persistence(BootstrapError),
    Generator(GeneratorError),
    OutOfRange { day: usize, source: OutOfRangeError },
    CalendarOverflow { start: NaiveDate, days: usize },
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SignInFailed(_) => "sign_in_failed",
            Self::Persistence(_) => "persistence",
            Self::Generator(_) => "generator_contract",
            Self::OutOfRange { .. } => "topic_out_of_range",
            Self::CalendarOverflow { .. } => "calendar_overflow",
        }
    }

    /// Whether starting a fresh task may succeed without other changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SignInFailed(_) | Self::Persistence(_))
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignInFailed(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Generator(err) => write!(f, "{err}"),
            Self::OutOfRange { day, source } => {
                write!(f, "generator output for day {day} is invalid: {source}")
            }
            Self::CalendarOverflow { start, days } => {
                write!(f, "{days} days starting {start} exceed the supported calendar")
            }
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SignInFailed(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Generator(err) => Some(err),
            Self::OutOfRange { source, .. } => Some(source),
            Self::CalendarOverflow { .. } => None,
        }
    }
}

impl From<SignInError> for PipelineError {
    fn from(value: SignInError) -> Self {
        Self::SignInFailed(value)
    }
}

impl From<BootstrapError> for PipelineError {
    fn from(value: BootstrapError) -> Self {
        Self::Persistence(value)
    }
}

impl From<GeneratorError> for PipelineError {
    fn from(value: GeneratorError) -> Self {
        Self::Generator(value)
    }
}

impl From<AssembleError> for PipelineError {
    fn from(value: AssembleError) -> Self {
        match value {
            AssembleError::OutOfRange { day, source } => Self::OutOfRange { day, source },
            AssembleError::CalendarOverflow { start, days } => {
                Self::CalendarOverflow { start, days }
            }
        }
    }
}

/// Successful task completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The routine was rendered into the target.
    Rendered {
        ticket: TaskTicket,
        user_id: UserId,
        record: UserRecord,
        routine: Routine,
    },
    /// A newer task started meanwhile; output was discarded and the target left as is.
    Stale { ticket: TaskTicket, latest: u64 },
}

/// Explicitly constructed collaborators for the routine pipeline.
pub struct AppContext<S, G, I>
where
    S: RecordStore,
    G: ScheduleGenerator,
    I: IdentityProvider,
{
    bootstrap: RecordBootstrap<S>,
    generator: G,
    identity: I,
    catalog: TopicCatalog,
    plan_size: NonZeroU32,
    gate: Arc<GenerationGate>,
}

impl<S, G, I> AppContext<S, G, I>
where
    S: RecordStore,
    G: ScheduleGenerator,
    I: IdentityProvider,
{
    pub fn new(
        store: S,
        generator: G,
        identity: I,
        catalog: TopicCatalog,
        plan_size: NonZeroU32,
    ) -> Self {
        Self {
            bootstrap: RecordBootstrap::new(store),
            generator,
            identity,
            catalog,
            plan_size,
            gate: Arc::new(GenerationGate::new()),
        }
    }

    /// Shares a generation gate with other contexts rendering to the same target.
    pub fn with_gate(mut self, gate: Arc<GenerationGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn gate(&self) -> &Arc<GenerationGate> {
        &self.gate
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    pub fn plan_size(&self) -> NonZeroU32 {
        self.plan_size
    }

    /// Runs one pipeline task dated from `today` and renders into `target`.
    ///
    /// # Errors
    /// Any error leaves `target` exactly as it was before the call.
    pub fn run<T: RenderTarget + ?Sized>(
        &self,
        today: NaiveDate,
        target: &mut T,
    ) -> Result<TaskOutcome, PipelineError> {
        let ticket = self.gate.begin();
        let task_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!(
            "event=pipeline_run module=pipeline status=start task_id={} generation={} plan_size={}",
            task_id,
            ticket.generation(),
            self.plan_size
        );

        let result = self.run_task(ticket, today, target);
        let duration_ms = started_at.elapsed().as_millis();
        match &result {
            Ok(TaskOutcome::Rendered { routine, .. }) => info!(
                "event=pipeline_run module=pipeline status=ok task_id={} generation={} days={} duration_ms={}",
                task_id,
                ticket.generation(),
                routine.len(),
                duration_ms
            ),
            Ok(TaskOutcome::Stale { latest, .. }) => warn!(
                "event=pipeline_run module=pipeline status=stale task_id={} generation={} latest_generation={} duration_ms={}",
                task_id,
                ticket.generation(),
                latest,
                duration_ms
            ),
            Err(err) => error!(
                "event=pipeline_run module=pipeline status=error task_id={} generation={} duration_ms={} error_code={} error={}",
                task_id,
                ticket.generation(),
                duration_ms,
                err.code(),
                err
            ),
        }
        result
    }

    fn run_task<T: RenderTarget + ?Sized>(
        &self,
        ticket: TaskTicket,
        today: NaiveDate,
        target: &mut T,
    ) -> Result<TaskOutcome, PipelineError> {
        let identity = match self.identity.current() {
            AuthState::SignedIn(identity) => identity,
            AuthState::SignedOut => {
                info!("event=sign_in module=pipeline status=start");
                self.identity.sign_in()?
            }
        };

        let record = self.bootstrap.ensure_record(&identity.user_id)?;
        let output = self.generator.generate(self.plan_size)?;
        let routine = assemble(&output, &self.catalog, today)?;

        if !self.gate.is_current(ticket) {
            return Ok(TaskOutcome::Stale {
                ticket,
                latest: self.gate.latest(),
            });
        }

        render_routine(target, &routine);
        Ok(TaskOutcome::Rendered {
            ticket,
            user_id: identity.user_id,
            record,
            routine,
        })
    }
}
