//! refract - AI content-repurposing engine
//!
//! Users attach source assets (video links, text, documents) to a program,
//! and an AI backend derives content artifacts (summaries, quizzes,
//! flashcards, case studies, lecture and narration scripts) from each asset
//! across multiple languages, with regeneration and versioning over time.
//!
//! # Architecture
//!
//! The system is built around versioned generated content:
//! - Every (asset, kind, language) key holds a history of artifact versions
//! - Exactly one artifact per key is the published "current" version
//! - Regeneration deprecates the prior version and appends its successor;
//!   history is never deleted
//! - Programs persist as whole documents: each mutation is a full
//!   load-mutate-save of the aggregate, last-writer-wins
//!
//! # Modules
//!
//! - `adapters`: External AI generator integrations
//! - `core`: Orchestration of generation and regeneration
//! - `domain`: Data structures (Program, Asset, Artifact) and selection
//! - `source`: Best-effort asset-to-text resolution
//! - `store`: Whole-document program persistence
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Create a program and attach a text asset
//! refract program create "Rust 101"
//! refract asset <program-id> --kind text --title "Notes" --content "..."
//!
//! # Generate a summary in two languages
//! refract generate <program-id> <asset-id> summary --languages en,es
//!
//! # Regenerate one artifact as a new version
//! refract regenerate <program-id> <asset-id> <artifact-id>
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod source;
pub mod store;

// Re-export main types at crate root for convenience
pub use core::{GenerationOutcome, LanguageFailure, Orchestrator};
pub use domain::{
    Artifact, ArtifactBody, ArtifactStatus, Asset, AssetKind, ContentKind, Program,
};
pub use error::{Entity, Error, Result};

// Generator seam
pub use adapters::{GenerateError, Generator, HttpGenerator};

// Persistence seam
pub use store::{JsonProgramStore, MemoryProgramStore, ProgramStore};
