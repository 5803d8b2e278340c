//! Schedule generator contract and engine adapters.
//!
//! # Responsibility
//! - Invoke a routine engine with a plan size.
//! - Decode its serialized payload into typed daily index lists.
//!
//! # Invariants
//! - Payloads must decode as "array of arrays of integers"; anything else is a
//!   contract error.
//! - No retries, caching or index range checks happen here.

use crate::model::topic::TopicIndex;
use crate::schedule::planner::{PlanError, Planner, PlannerSettings};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

/// Typed generator output: one inner list of topic indices per day.
pub type GeneratorOutput = Vec<Vec<TopicIndex>>;

/// Raw engine failure, before any payload is available.
#[derive(Debug)]
pub enum EngineError {
    Plan(PlanError),
    Encode(serde_json::Error),
    Spawn { program: PathBuf, source: std::io::Error },
    ExitStatus { program: PathBuf, code: Option<i32>, stderr: String },
    NonUtf8Output { program: PathBuf },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plan(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode built plan: {err}"),
            Self::Spawn { program, source } => {
                write!(f, "failed to start `{}`: {source}", program.display())
            }
            Self::ExitStatus {
                program,
                code,
                stderr,
            } => match code {
                Some(code) => write!(
                    f,
                    "`{}` exited with status {code}: {}",
                    program.display(),
                    stderr.trim()
                ),
                None => write!(f, "`{}` was terminated by a signal", program.display()),
            },
            Self::NonUtf8Output { program } => {
                write!(f, "`{}` produced non UTF-8 output", program.display())
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Plan(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PlanError> for EngineError {
    fn from(value: PlanError) -> Self {
        Self::Plan(value)
    }
}

/// Failure of the generator contract as seen by the pipeline.
#[derive(Debug)]
pub enum GeneratorError {
    /// The engine call itself failed.
    Engine(EngineError),
    /// The engine answered, but not with an array of integer arrays.
    Contract(serde_json::Error),
}

impl Display for GeneratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "routine engine failed: {err}"),
            Self::Contract(err) => write!(
                f,
                "routine engine payload is not an array of integer arrays: {err}"
            ),
        }
    }
}

impl Error for GeneratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::Contract(err) => Some(err),
        }
    }
}

impl From<EngineError> for GeneratorError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Black-box routine engine returning its native serialized payload.
pub trait RoutineEngine {
    fn build(&self, plan_size: NonZeroU32) -> Result<String, EngineError>;
}

/// Typed schedule source consumed by the pipeline.
pub trait ScheduleGenerator {
    fn generate(&self, plan_size: NonZeroU32) -> Result<GeneratorOutput, GeneratorError>;
}

impl<T: ScheduleGenerator + ?Sized> ScheduleGenerator for &T {
    fn generate(&self, plan_size: NonZeroU32) -> Result<GeneratorOutput, GeneratorError> {
        (**self).generate(plan_size)
    }
}

/// Decodes a serialized engine payload.
pub fn parse_payload(payload: &str) -> Result<GeneratorOutput, GeneratorError> {
    serde_json::from_str(payload).map_err(GeneratorError::Contract)
}

/// Adapts a raw [`RoutineEngine`] to the typed [`ScheduleGenerator`] contract.
#[derive(Debug, Clone)]
pub struct EngineGenerator<E: RoutineEngine> {
    engine: E,
}

impl<E: RoutineEngine> EngineGenerator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }
}

impl<E: RoutineEngine> ScheduleGenerator for EngineGenerator<E> {
    fn generate(&self, plan_size: NonZeroU32) -> Result<GeneratorOutput, GeneratorError> {
        let started_at = Instant::now();
        let result = self
            .engine
            .build(plan_size)
            .map_err(GeneratorError::from)
            .and_then(|payload| parse_payload(&payload));

        match &result {
            Ok(output) => info!(
                "event=generator_call module=schedule status=ok plan_size={} days={} duration_ms={}",
                plan_size,
                output.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=generator_call module=schedule status=error plan_size={} duration_ms={} error_code={} error={}",
                plan_size,
                started_at.elapsed().as_millis(),
                generator_error_code(err),
                err
            ),
        }

        result
    }
}

fn generator_error_code(err: &GeneratorError) -> &'static str {
    match err {
        GeneratorError::Engine(_) => "engine_failed",
        GeneratorError::Contract(_) => "payload_contract",
    }
}

/// In-process engine backed by the gap-aware [`Planner`].
#[derive(Debug, Clone)]
pub struct BuiltinEngine {
    settings: PlannerSettings,
}

impl BuiltinEngine {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }
}

impl RoutineEngine for BuiltinEngine {
    fn build(&self, plan_size: NonZeroU32) -> Result<String, EngineError> {
        let plan = Planner::new(self.settings.clone())?.build(plan_size.get())?;
        serde_json::to_string_pretty(&plan).map_err(EngineError::Encode)
    }
}

/// Engine living in an external executable invoked as `program [args..] -n <plan_size>`.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl RoutineEngine for CommandEngine {
    fn build(&self, plan_size: NonZeroU32) -> Result<String, EngineError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("-n")
            .arg(plan_size.to_string())
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::ExitStatus {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| EngineError::NonUtf8Output {
            program: self.program.clone(),
        })
    }
}

/// Engine selected from configuration at runtime.
#[derive(Debug, Clone)]
pub enum ConfiguredEngine {
    Builtin(BuiltinEngine),
    Command(CommandEngine),
}

impl RoutineEngine for ConfiguredEngine {
    fn build(&self, plan_size: NonZeroU32) -> Result<String, EngineError> {
        match self {
            Self::Builtin(engine) => engine.build(plan_size),
            Self::Command(engine) => engine.build(plan_size),
        }
    }
}
