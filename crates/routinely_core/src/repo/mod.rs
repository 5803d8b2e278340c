//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the keyed record store contract consumed by the bootstrap.
//! - Isolate SQLite query details from service/pipeline orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod plan_repo;
pub mod practice_log_repo;
pub mod record_repo;
