//! Error taxonomy for the content engine.
//!
//! Every failure that crosses the orchestration boundary is one of these
//! variants. Lower layers never swallow errors; best-effort source
//! resolution is the single exception and degrades to a placeholder
//! instead of failing.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the content engine
#[derive(Debug, Error)]
pub enum Error {
    /// A program, asset, or artifact id did not resolve
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// A request was missing or malformed before any generation was attempted
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The external generator failed or returned unusable output
    #[error("generation failed for '{language}': {source}")]
    Generation {
        language: String,
        #[source]
        source: crate::adapters::GenerateError,
    },

    /// Aggregate load/save failed
    #[error("persistence failure: {reason}")]
    Persistence {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl Error {
    /// Shorthand for a not-found error
    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a persistence error without an I/O cause
    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence {
            reason: reason.into(),
            source: None,
        }
    }

    /// Persistence error wrapping an I/O cause
    pub fn persistence_io(reason: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            reason: reason.into(),
            source: Some(source),
        }
    }

    /// True if this is a not-found condition (client-visible 404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Entity kinds that can fail to resolve by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Program,
    Asset,
    Artifact,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Program => write!(f, "program"),
            Entity::Asset => write!(f, "asset"),
            Entity::Artifact => write!(f, "artifact"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found(Entity::Artifact, "abc-123");
        assert_eq!(err.to_string(), "artifact not found: abc-123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation("at least one language is required");
        assert_eq!(
            err.to_string(),
            "validation failed: at least one language is required"
        );
        assert!(!err.is_not_found());
    }
}
