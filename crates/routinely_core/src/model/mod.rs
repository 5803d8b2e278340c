//! Domain model for routine scheduling.
//!
//! # Responsibility
//! - Define the catalog, routine and user record shapes used across core.
//!
//! # Invariants
//! - Model values are immutable once built by their constructors.

pub mod practice_log;
pub mod record;
pub mod routine;
pub mod saved_plan;
pub mod topic;
