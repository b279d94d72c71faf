//! Domain types for the content engine.
//!
//! This module contains the core data structures:
//! - Program/Asset: The persisted aggregate and its source assets
//! - Artifact: One version of generated content for a (kind, language) key
//! - Selection: Read-only "current artifact" queries for display

pub mod artifact;
pub mod program;
pub mod selection;

// Re-export commonly used types
pub use artifact::{
    fingerprint, Artifact, ArtifactBody, ArtifactStatus, CaseStudy, ContentKind, Flashcard,
    QuizQuestion, ScriptScene, VideoScript,
};
pub use program::{Asset, AssetKind, Program};
pub use selection::{count_visible, for_language, latest_artifacts};
