//! Generation and regeneration orchestration.
//!
//! Drives the external generator across one or more languages, appending
//! results into the target asset's content history and persisting the whole
//! program aggregate after every successful append. Languages are processed
//! sequentially; each one is a full load-mutate-save cycle so a failure
//! never disturbs what earlier languages already persisted.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::adapters::Generator;
use crate::domain::{fingerprint, Artifact, ContentKind};
use crate::error::{Error, Result};
use crate::source::SourceResolver;
use crate::store::ProgramStore;

/// Coordinates generator, resolver, and store
pub struct Orchestrator {
    generator: Arc<dyn Generator>,
    store: Arc<dyn ProgramStore>,
    resolver: Arc<dyn SourceResolver>,
}

/// Result of a multi-language generation batch
#[derive(Debug, Default)]
pub struct GenerationOutcome {
    /// Newly created artifacts, in request order
    pub artifacts: Vec<Artifact>,

    /// Languages whose generation failed (nothing was persisted for them)
    pub failures: Vec<LanguageFailure>,
}

impl GenerationOutcome {
    /// True if every requested language produced an artifact
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A failed language within a generation batch
#[derive(Debug)]
pub struct LanguageFailure {
    /// The language that failed
    pub language: String,

    /// What went wrong
    pub error: Error,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        generator: Arc<dyn Generator>,
        store: Arc<dyn ProgramStore>,
        resolver: Arc<dyn SourceResolver>,
    ) -> Self {
        Self {
            generator,
            store,
            resolver,
        }
    }

    /// Generate `kind` content for an asset across one or more languages.
    ///
    /// Languages run sequentially in request order. A generator failure for
    /// one language is recorded in the outcome and the batch continues;
    /// artifacts persisted for earlier languages are never rolled back.
    #[instrument(skip(self, languages), fields(program = %program_id, asset = %asset_id, kind = %kind))]
    pub async fn generate(
        &self,
        program_id: Uuid,
        asset_id: Uuid,
        kind: ContentKind,
        languages: &[String],
    ) -> Result<GenerationOutcome> {
        let languages = normalize_languages(languages)?;

        // Resolve source text once, from the asset as currently persisted
        let program = self.store.load(program_id).await?;
        let asset = program.asset(asset_id)?;
        let asset_title = asset.title.clone();
        let source_text = self.resolver.resolve(asset).await;
        let source_fingerprint = fingerprint(&source_text);

        info!(languages = languages.len(), "Starting generation batch");

        let mut outcome = GenerationOutcome::default();

        for language in &languages {
            let body = match self.generator.generate(kind, &source_text, language).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(language, error = %e, "Generation failed, continuing batch");
                    outcome.failures.push(LanguageFailure {
                        language: language.clone(),
                        error: Error::Generation {
                            language: language.clone(),
                            source: e,
                        },
                    });
                    continue;
                }
            };

            // Full load-mutate-save cycle per language: always mutate the
            // latest persisted copy of the aggregate.
            let mut program = self.store.load(program_id).await?;
            let asset = program.asset_mut(asset_id)?;

            let version = asset.max_version(kind, language) + 1;
            let artifact =
                Artifact::new(kind, artifact_title(kind, &asset_title), body, language.as_str())
                    .with_version(version)
                    .with_fingerprint(source_fingerprint.clone());

            info!(language, version, artifact = %artifact.id, "Appending artifact");

            asset.append_artifact(artifact.clone());
            self.store.save(&mut program).await?;

            outcome.artifacts.push(artifact);
        }

        Ok(outcome)
    }

    /// Supersede one existing artifact with a freshly generated version.
    ///
    /// On generator failure the program is left untouched and the prior
    /// artifact stays published.
    #[instrument(skip(self), fields(program = %program_id, asset = %asset_id, artifact = %artifact_id))]
    pub async fn regenerate(
        &self,
        program_id: Uuid,
        asset_id: Uuid,
        artifact_id: Uuid,
    ) -> Result<Artifact> {
        let mut program = self.store.load(program_id).await?;

        let (kind, language, source_text) = {
            let asset = program.asset(asset_id)?;
            let artifact = asset.artifact(artifact_id)?;
            let kind = artifact.kind;
            let language = artifact.language.clone();
            let source_text = self.resolver.resolve(asset).await;
            (kind, language, source_text)
        };

        let body = self
            .generator
            .generate(kind, &source_text, &language)
            .await
            .map_err(|e| Error::Generation {
                language: language.clone(),
                source: e,
            })?;

        let source_fingerprint = fingerprint(&source_text);

        let successor = {
            let asset = program.asset_mut(asset_id)?;
            let successor = asset.supersede_artifact(artifact_id, body)?;
            successor.source_fingerprint = Some(source_fingerprint);
            successor.clone()
        };

        self.store.save(&mut program).await?;

        info!(
            language,
            version = successor.version,
            artifact = %successor.id,
            "Superseded artifact"
        );

        Ok(successor)
    }
}

/// Validate and normalize requested language codes
fn normalize_languages(languages: &[String]) -> Result<Vec<String>> {
    if languages.is_empty() {
        return Err(Error::validation("at least one language is required"));
    }

    languages
        .iter()
        .map(|l| {
            let normalized = l.trim().to_lowercase();
            if normalized.is_empty() {
                Err(Error::validation("language code cannot be blank"))
            } else {
                Ok(normalized)
            }
        })
        .collect()
}

/// Display title for a freshly generated artifact
fn artifact_title(kind: ContentKind, asset_title: &str) -> String {
    format!("{} ({})", asset_title, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::GenerateError;
    use crate::domain::{Asset, ArtifactBody, Program};
    use crate::source::DefaultResolver;
    use crate::store::MemoryProgramStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Generator fake that replays scripted results per call
    struct ScriptedGenerator {
        script: Mutex<Vec<std::result::Result<ArtifactBody, GenerateError>>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<std::result::Result<ArtifactBody, GenerateError>>) -> Self {
            Self {
                script: Mutex::new(script),
            }
        }

        fn always_text(text: &str, calls: usize) -> Self {
            Self::new(
                (0..calls)
                    .map(|_| Ok(ArtifactBody::Text(text.to_string())))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(
            &self,
            _kind: ContentKind,
            _source_text: &str,
            _language: &str,
        ) -> std::result::Result<ArtifactBody, GenerateError> {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(GenerateError::backend("script exhausted"));
            }
            script.remove(0)
        }

        async fn health_check(&self) -> std::result::Result<(), GenerateError> {
            Ok(())
        }
    }

    async fn seeded_store() -> (Arc<MemoryProgramStore>, Uuid, Uuid) {
        let store = Arc::new(MemoryProgramStore::new());
        let mut program = Program::new("Rust 101", "user-1");
        let asset = Asset::text("Ownership notes", "Ownership moves values.");
        let asset_id = asset.id;
        program.add_asset(asset);
        let program_id = program.id;
        store.save(&mut program).await.unwrap();
        (store, program_id, asset_id)
    }

    fn orchestrator(
        generator: ScriptedGenerator,
        store: Arc<MemoryProgramStore>,
    ) -> Orchestrator {
        Orchestrator::new(
            Arc::new(generator),
            store,
            Arc::new(DefaultResolver::new()),
        )
    }

    #[tokio::test]
    async fn test_empty_languages_is_validation_error() {
        let (store, program_id, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("x", 0), store);

        let err = orch
            .generate(program_id, asset_id, ContentKind::Summary, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_blank_language_is_validation_error() {
        let (store, program_id, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("x", 1), store);

        let err = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &["  ".to_string()],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_program_is_not_found() {
        let (store, _, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("x", 1), store);

        let err = orch
            .generate(
                Uuid::new_v4(),
                asset_id,
                ContentKind::Summary,
                &["en".to_string()],
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_generation_persists_each_language() {
        let (store, program_id, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("summary", 2), store.clone());

        let outcome = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &["en".to_string(), "es".to_string()],
            )
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.artifacts.len(), 2);
        assert_eq!(outcome.artifacts[0].language, "en");
        assert_eq!(outcome.artifacts[1].language, "es");
        assert!(outcome.artifacts.iter().all(|a| a.version == 1));

        let program = store.load(program_id).await.unwrap();
        assert_eq!(program.asset(asset_id).unwrap().generated.len(), 2);
    }

    #[tokio::test]
    async fn test_language_codes_are_normalized() {
        let (store, program_id, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("summary", 1), store);

        let outcome = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &[" EN ".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(outcome.artifacts[0].language, "en");
    }

    #[tokio::test]
    async fn test_failed_language_continues_batch() {
        let (store, program_id, asset_id) = seeded_store().await;
        let generator = ScriptedGenerator::new(vec![
            Err(GenerateError::backend("quota exceeded")),
            Ok(ArtifactBody::Text("hola".to_string())),
        ]);
        let orch = orchestrator(generator, store.clone());

        let outcome = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &["en".to_string(), "es".to_string()],
            )
            .await
            .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].language, "en");
        assert_eq!(outcome.artifacts.len(), 1);
        assert_eq!(outcome.artifacts[0].language, "es");

        // Nothing was persisted for the failed language
        let program = store.load(program_id).await.unwrap();
        let generated = &program.asset(asset_id).unwrap().generated;
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].language, "es");
    }

    #[tokio::test]
    async fn test_generate_continues_versioning_for_existing_key() {
        let (store, program_id, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("summary", 2), store);

        let first = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &["en".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(first.artifacts[0].version, 1);

        // Generating again on the same key continues from the max version
        let second = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &["en".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(second.artifacts[0].version, 2);
    }

    #[tokio::test]
    async fn test_regenerate_supersedes_and_persists() {
        let (store, program_id, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("v1 then v2", 2), store.clone());

        let outcome = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &["en".to_string()],
            )
            .await
            .unwrap();
        let first_id = outcome.artifacts[0].id;

        let successor = orch
            .regenerate(program_id, asset_id, first_id)
            .await
            .unwrap();

        assert_eq!(successor.version, 2);
        assert!(successor.source_fingerprint.is_some());

        let program = store.load(program_id).await.unwrap();
        let asset = program.asset(asset_id).unwrap();
        assert!(!asset.artifact(first_id).unwrap().is_visible());
        assert!(asset.artifact(successor.id).unwrap().is_visible());
    }

    #[tokio::test]
    async fn test_regenerate_unknown_artifact_is_not_found() {
        let (store, program_id, asset_id) = seeded_store().await;
        let orch = orchestrator(ScriptedGenerator::always_text("x", 1), store.clone());

        let err = orch
            .regenerate(program_id, asset_id, Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(err.is_not_found());

        let program = store.load(program_id).await.unwrap();
        assert!(program.asset(asset_id).unwrap().generated.is_empty());
    }

    #[tokio::test]
    async fn test_regenerate_failure_leaves_program_untouched() {
        let (store, program_id, asset_id) = seeded_store().await;
        let generator = ScriptedGenerator::new(vec![
            Ok(ArtifactBody::Text("v1".to_string())),
            Err(GenerateError::backend("model unavailable")),
        ]);
        let orch = orchestrator(generator, store.clone());

        let outcome = orch
            .generate(
                program_id,
                asset_id,
                ContentKind::Summary,
                &["en".to_string()],
            )
            .await
            .unwrap();
        let first_id = outcome.artifacts[0].id;

        let err = orch
            .regenerate(program_id, asset_id, first_id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation { .. }));

        // Prior artifact is still the published current version
        let program = store.load(program_id).await.unwrap();
        let asset = program.asset(asset_id).unwrap();
        assert_eq!(asset.generated.len(), 1);
        assert!(asset.artifact(first_id).unwrap().is_visible());
    }
}
