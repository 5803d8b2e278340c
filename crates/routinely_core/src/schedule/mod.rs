//! Routine scheduling: date sequencing, generator adapters and assembly.
//!
//! # Responsibility
//! - Turn a plan size into typed daily topic indices via a routine engine.
//! - Resolve those indices into a dated, labeled [`crate::Routine`].
//!
//! # Invariants
//! - Generator adapters never validate index ranges; the assembler does.

pub mod assembler;
pub mod dates;
pub mod generator;
pub mod planner;
