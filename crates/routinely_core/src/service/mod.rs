//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the pipeline and CLI decoupled from storage details.

pub mod bootstrap_service;
pub mod plan_service;
pub mod practice_log_service;
