//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface to the AI backend that derives
//! content from source text. The orchestrator only sees the `Generator`
//! trait; concrete clients are constructed explicitly and injected.

pub mod http;
pub mod parse;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ArtifactBody, ContentKind};

// Re-export the HTTP generator
pub use http::HttpGenerator;

/// Errors from the generation backend
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The backend call itself failed (network, quota, model error)
    #[error("generator backend failed: {message}")]
    Backend { message: String },

    /// The model replied, but structured output could not be parsed
    #[error("unparseable generator output: {reason}")]
    Unparseable { reason: String },

    /// The model replied with nothing usable
    #[error("generator returned empty output")]
    EmptyOutput,
}

impl GenerateError {
    /// Shorthand for a backend failure
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Shorthand for a parse failure
    pub fn unparseable(reason: impl Into<String>) -> Self {
        Self::Unparseable {
            reason: reason.into(),
        }
    }
}

/// Trait for AI content generators
#[async_trait]
pub trait Generator: Send + Sync {
    /// Human-readable generator name
    fn name(&self) -> &str;

    /// Derive a content body of `kind` in `language` from `source_text`
    async fn generate(
        &self,
        kind: ContentKind,
        source_text: &str,
        language: &str,
    ) -> Result<ArtifactBody, GenerateError>;

    /// Health check (for HTTP backends)
    async fn health_check(&self) -> Result<(), GenerateError>;
}

/// Build the instruction prompt for a (kind, language) request.
///
/// Structured kinds instruct the model to answer with bare JSON so the
/// parser can recover the payload even when the model wraps it in prose.
pub fn instructions_for(kind: ContentKind, language: &str) -> String {
    let task = match kind {
        ContentKind::Summary => {
            "Write a concise summary of the source material in 3-5 paragraphs.".to_string()
        }
        ContentKind::ShortLecture => {
            "Write a short lecture script (5-7 minutes spoken) teaching the source material."
                .to_string()
        }
        ContentKind::AudioTrack => {
            "Write a narration script suitable for text-to-speech playback, \
             covering the source material conversationally."
                .to_string()
        }
        ContentKind::Quiz => "Create 5 multiple-choice questions testing the source material. \
             Respond with a JSON array of objects with fields: question, options \
             (array of strings), answer_index (integer), explanation."
            .to_string(),
        ContentKind::Flashcards => "Create 10 flashcards covering the source material. Respond with a \
             JSON array of objects with fields: front, back."
            .to_string(),
        ContentKind::CaseStudy => "Create an applied case study based on the source material. Respond \
             with a JSON object with fields: background, challenge, questions \
             (array of strings)."
            .to_string(),
        ContentKind::VideoScript => "Write a scene-by-scene video script for the source material. Respond \
             with a JSON object with fields: hook, scenes (array of objects with \
             fields: heading, narration)."
            .to_string(),
    };

    format!("{} Answer in language: {}.", task, language)
}
