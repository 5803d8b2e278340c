//! Application configuration.
//!
//! # Responsibility
//! - Load routine settings from a TOML file with per-field defaults.
//! - Validate settings up front so pipeline tasks never see bad config.
//!
//! # Invariants
//! - An empty file is a valid configuration.
//! - `items_per_session` never exceeds the catalog size.
//! - A `command` engine always names a program.

use crate::logging::default_log_level;
use crate::model::topic::{CatalogError, TopicCatalog};
use crate::schedule::generator::{BuiltinEngine, CommandEngine, ConfiguredEngine};
use crate::schedule::planner::{
    PlanError, PlannerSettings, DEFAULT_ITEMS_PER_SESSION, DEFAULT_MAX_GAP,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

const DEFAULT_PLAN_SIZE: u32 = 1;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    Catalog(CatalogError),
    Plan(PlanError),
    MissingEngineProgram,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::Catalog(err) => write!(f, "invalid topics: {err}"),
            Self::Plan(err) => write!(f, "invalid planner settings: {err}"),
            Self::MissingEngineProgram => {
                write!(f, "engine.kind = \"command\" requires engine.program")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Catalog(err) => Some(err),
            Self::Plan(err) => Some(err),
            Self::MissingEngineProgram => None,
        }
    }
}

impl From<CatalogError> for ConfigError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<PlanError> for ConfigError {
    fn from(value: PlanError) -> Self {
        Self::Plan(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    pub items_per_session: usize,
    pub max_gap: usize,
    pub seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            items_per_session: DEFAULT_ITEMS_PER_SESSION,
            max_gap: DEFAULT_MAX_GAP,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Builtin,
    Command,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub program: Option<PathBuf>,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory; file logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Number of days the generator is asked for.
    pub plan_size: NonZeroU32,
    /// SQLite store location; in-memory when unset.
    pub db_path: Option<PathBuf>,
    /// Custom topic labels replacing the built-in catalog.
    pub topics: Option<Vec<String>>,
    pub planner: PlannerConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            plan_size: NonZeroU32::MIN.saturating_add(DEFAULT_PLAN_SIZE - 1),
            db_path: None,
            topics: None,
            planner: PlannerConfig::default(),
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = self.catalog()?;
        self.planner_settings(&catalog).validate()?;
        if self.engine.kind == EngineKind::Command && self.engine.program.is_none() {
            return Err(ConfigError::MissingEngineProgram);
        }
        Ok(())
    }

    /// Topic catalog: configured labels, or the built-in catalog.
    pub fn catalog(&self) -> Result<TopicCatalog, ConfigError> {
        match &self.topics {
            Some(labels) => Ok(TopicCatalog::from_labels(labels)?),
            None => Ok(TopicCatalog::default_catalog().clone()),
        }
    }

    pub fn planner_settings(&self, catalog: &TopicCatalog) -> PlannerSettings {
        PlannerSettings {
            topic_count: catalog.len(),
            items_per_session: self.planner.items_per_session,
            max_gap: self.planner.max_gap,
            seed: self.planner.seed,
        }
    }

    pub fn engine(&self, catalog: &TopicCatalog) -> Result<ConfiguredEngine, ConfigError> {
        match self.engine.kind {
            EngineKind::Builtin => Ok(ConfiguredEngine::Builtin(BuiltinEngine::new(
                self.planner_settings(catalog),
            ))),
            EngineKind::Command => {
                let program = self
                    .engine
                    .program
                    .clone()
                    .ok_or(ConfigError::MissingEngineProgram)?;
                Ok(ConfiguredEngine::Command(CommandEngine::new(
                    program,
                    self.engine.args.clone(),
                )))
            }
        }
    }

    /// Hex SHA-256 over the settings that decide what a session contains:
    /// topic labels, planner settings and engine selection.
    ///
    /// Plan size, storage and logging settings do not contribute.
    pub fn plan_fingerprint(&self, catalog: &TopicCatalog) -> String {
        let mut hasher = Sha256::new();
        for topic in catalog.topics() {
            hash_field(&mut hasher, "topic", topic.label.as_bytes());
        }
        hash_field(
            &mut hasher,
            "items_per_session",
            &(self.planner.items_per_session as u64).to_le_bytes(),
        );
        hash_field(&mut hasher, "max_gap", &(self.planner.max_gap as u64).to_le_bytes());
        if let Some(seed) = self.planner.seed {
            hash_field(&mut hasher, "seed", &seed.to_le_bytes());
        }
        hash_field(&mut hasher, "engine", format!("{:?}", self.engine.kind).as_bytes());
        if let Some(program) = &self.engine.program {
            hash_field(&mut hasher, "program", program.to_string_lossy().as_bytes());
        }
        for arg in &self.engine.args {
            hash_field(&mut hasher, "arg", arg.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

// Length-prefixed so adjacent fields cannot run together.
fn hash_field(hasher: &mut Sha256, name: &str, value: &[u8]) {
    hasher.update(name.as_bytes());
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value);
}
