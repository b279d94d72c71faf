//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: drives generation and regeneration against the
//!   injected generator, resolver, and store

pub mod orchestrator;

// Re-export commonly used types
pub use orchestrator::{GenerationOutcome, LanguageFailure, Orchestrator};
