//! Read-only selection over generated-content history.
//!
//! Given an asset's artifact list, computes the "current" artifact per
//! (kind, language) key for display and counting. Never mutates state.

use std::collections::BTreeMap;

use super::artifact::{Artifact, ContentKind};

/// The current artifact for every distinct (kind, language) key among
/// published artifacts, optionally restricted to one language and/or kind.
///
/// Draft and deprecated artifacts are invisible here. Within a key the
/// highest version wins; equal versions (which only arise from racing
/// writers) break deterministically on later `generated_at`, then larger id.
/// Results are ordered by (kind, language) for stable display.
pub fn latest_artifacts<'a>(
    artifacts: &'a [Artifact],
    language: Option<&str>,
    kind: Option<ContentKind>,
) -> Vec<&'a Artifact> {
    let mut current: BTreeMap<(ContentKind, &str), &Artifact> = BTreeMap::new();

    for artifact in artifacts {
        if !artifact.is_visible() {
            continue;
        }
        if let Some(language) = language {
            if artifact.language != language {
                continue;
            }
        }
        if let Some(kind) = kind {
            if artifact.kind != kind {
                continue;
            }
        }

        current
            .entry(artifact.key())
            .and_modify(|best| {
                if ranks_above(artifact, best) {
                    *best = artifact;
                }
            })
            .or_insert(artifact);
    }

    current.into_values().collect()
}

/// Number of distinct (kind, language) keys visible to readers.
/// Equals `latest_artifacts(artifacts, None, None).len()`.
pub fn count_visible(artifacts: &[Artifact]) -> usize {
    latest_artifacts(artifacts, None, None).len()
}

/// The language-tab view: current artifacts for a single language.
/// A tab is rendered only when this is non-empty.
pub fn for_language<'a>(artifacts: &'a [Artifact], language: &str) -> Vec<&'a Artifact> {
    latest_artifacts(artifacts, Some(language), None)
}

fn ranks_above(candidate: &Artifact, best: &Artifact) -> bool {
    (candidate.version, candidate.generated_at, candidate.id)
        > (best.version, best.generated_at, best.id)
}
