//! Generated-content artifacts and their bodies.
//!
//! An artifact is one version of one content kind, in one language, derived
//! from one asset. Artifacts are never deleted: superseded versions stay in
//! the asset's history as `Deprecated`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// One version of generated content for a (kind, language) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique identifier for this version
    pub id: Uuid,

    /// What kind of content this is
    pub kind: ContentKind,

    /// Display title (copied unchanged across versions)
    pub title: String,

    /// The generated content itself
    pub body: ArtifactBody,

    /// Language code (e.g. "en", "es")
    pub language: String,

    /// When this version was generated
    pub generated_at: DateTime<Utc>,

    /// Publication flag, kept in sync with `status`
    #[serde(default = "default_published")]
    pub is_published: bool,

    /// Version number within the (kind, language) key, starting at 1
    #[serde(default = "default_version")]
    pub version: u32,

    /// Lifecycle status
    #[serde(default)]
    pub status: ArtifactStatus,

    /// Fingerprint of the source text this version was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_fingerprint: Option<String>,
}

// Documents written before versioning existed read back as a visible v1.
fn default_version() -> u32 {
    1
}

fn default_published() -> bool {
    true
}

impl Artifact {
    /// Create a version-1 artifact, published immediately
    pub fn new(
        kind: ContentKind,
        title: impl Into<String>,
        body: ArtifactBody,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            body,
            language: language.into(),
            generated_at: Utc::now(),
            is_published: true,
            version: 1,
            status: ArtifactStatus::Published,
            source_fingerprint: None,
        }
    }

    /// Set the version number
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the source fingerprint
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.source_fingerprint = Some(fingerprint.into());
        self
    }

    /// Build the successor version: same kind/language/title, new body,
    /// fresh id and timestamp
    pub fn successor(&self, body: ArtifactBody, version: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: self.kind,
            title: self.title.clone(),
            body,
            language: self.language.clone(),
            generated_at: Utc::now(),
            is_published: true,
            version,
            status: ArtifactStatus::Published,
            source_fingerprint: None,
        }
    }

    /// Mark this artifact as superseded
    pub fn deprecate(&mut self) {
        self.status = ArtifactStatus::Deprecated;
        self.is_published = false;
    }

    /// The (kind, language) key this artifact belongs to
    pub fn key(&self) -> (ContentKind, &str) {
        (self.kind, self.language.as_str())
    }

    /// True if this artifact is visible to readers
    pub fn is_visible(&self) -> bool {
        self.status == ArtifactStatus::Published
    }
}

/// Fingerprint source text (first 16 hex chars of SHA256)
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// Kinds of content the generator can derive from an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Prose summary of the source
    Summary,

    /// Multiple-choice quiz
    Quiz,

    /// Applied case study
    CaseStudy,

    /// Condensed lecture script
    ShortLecture,

    /// Question/answer flashcards
    Flashcards,

    /// Narration script for audio playback
    AudioTrack,

    /// Scene-by-scene video script
    VideoScript,
}

impl ContentKind {
    /// All kinds, in display order
    pub fn all() -> &'static [ContentKind] {
        &[
            ContentKind::Summary,
            ContentKind::Quiz,
            ContentKind::CaseStudy,
            ContentKind::ShortLecture,
            ContentKind::Flashcards,
            ContentKind::AudioTrack,
            ContentKind::VideoScript,
        ]
    }

    /// True if the generator must return structured data for this kind
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            ContentKind::Quiz
                | ContentKind::CaseStudy
                | ContentKind::Flashcards
                | ContentKind::VideoScript
        )
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Summary => write!(f, "summary"),
            ContentKind::Quiz => write!(f, "quiz"),
            ContentKind::CaseStudy => write!(f, "case_study"),
            ContentKind::ShortLecture => write!(f, "short_lecture"),
            ContentKind::Flashcards => write!(f, "flashcards"),
            ContentKind::AudioTrack => write!(f, "audio_track"),
            ContentKind::VideoScript => write!(f, "video_script"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(ContentKind::Summary),
            "quiz" => Ok(ContentKind::Quiz),
            "case_study" | "case-study" | "casestudy" => Ok(ContentKind::CaseStudy),
            "short_lecture" | "short-lecture" | "lecture" => Ok(ContentKind::ShortLecture),
            "flashcards" | "flashcard" => Ok(ContentKind::Flashcards),
            "audio_track" | "audio-track" | "audio" => Ok(ContentKind::AudioTrack),
            "video_script" | "video-script" => Ok(ContentKind::VideoScript),
            _ => anyhow::bail!("Unknown content kind: {}", s),
        }
    }
}

/// Lifecycle status of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Created but not yet visible
    Draft,

    /// The current visible version for its key
    Published,

    /// Superseded by a later version
    Deprecated,
}

impl Default for ArtifactStatus {
    // Documents written before the status field existed stay visible.
    fn default() -> Self {
        Self::Published
    }
}

/// The generated content, shaped by its kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "format", content = "data", rename_all = "snake_case")]
pub enum ArtifactBody {
    /// Plain prose (summary, short lecture, audio narration script)
    Text(String),

    /// Quiz questions
    Quiz(Vec<QuizQuestion>),

    /// Flashcard deck
    Flashcards(Vec<Flashcard>),

    /// Case study record
    CaseStudy(CaseStudy),

    /// Video script record
    VideoScript(VideoScript),
}

impl ArtifactBody {
    /// Short one-line preview for listings
    pub fn preview(&self, max_chars: usize) -> String {
        let line = match self {
            ArtifactBody::Text(text) => text.lines().next().unwrap_or("").to_string(),
            ArtifactBody::Quiz(questions) => format!("{} questions", questions.len()),
            ArtifactBody::Flashcards(cards) => format!("{} cards", cards.len()),
            ArtifactBody::CaseStudy(cs) => cs.background.lines().next().unwrap_or("").to_string(),
            ArtifactBody::VideoScript(script) => format!("{} scenes", script.scenes.len()),
        };

        if line.chars().count() > max_chars {
            let truncated: String = line.chars().take(max_chars).collect();
            format!("{}...", truncated)
        } else {
            line
        }
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text
    pub question: String,

    /// Answer options, in display order
    pub options: Vec<String>,

    /// Index into `options` of the correct answer
    pub answer_index: usize,

    /// Optional explanation shown after answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A single flashcard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    /// Prompt side
    pub front: String,

    /// Answer side
    pub back: String,
}

/// An applied case study derived from the source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseStudy {
    /// Scenario background
    pub background: String,

    /// The central challenge to work through
    pub challenge: String,

    /// Discussion questions
    #[serde(default)]
    pub questions: Vec<String>,
}

/// A scene-by-scene video script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoScript {
    /// Opening hook
    pub hook: String,

    /// Ordered scenes
    pub scenes: Vec<ScriptScene>,
}

/// One scene of a video script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptScene {
    /// Scene heading
    pub heading: String,

    /// Narration for this scene
    pub narration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_artifact_is_published_v1() {
        let artifact = Artifact::new(
            ContentKind::Summary,
            "Intro summary",
            ArtifactBody::Text("A short summary.".to_string()),
            "en",
        );

        assert_eq!(artifact.version, 1);
        assert_eq!(artifact.status, ArtifactStatus::Published);
        assert!(artifact.is_published);
        assert!(artifact.is_visible());
    }

    #[test]
    fn test_successor_copies_title_and_key() {
        let first = Artifact::new(
            ContentKind::Quiz,
            "Chapter quiz",
            ArtifactBody::Quiz(Vec::new()),
            "es",
        );

        let second = first.successor(ArtifactBody::Quiz(Vec::new()), 2);

        assert_ne!(second.id, first.id);
        assert_eq!(second.title, "Chapter quiz");
        assert_eq!(second.key(), first.key());
        assert_eq!(second.version, 2);
        assert_eq!(second.status, ArtifactStatus::Published);
    }

    #[test]
    fn test_deprecate_clears_publication() {
        let mut artifact = Artifact::new(
            ContentKind::Summary,
            "S",
            ArtifactBody::Text("t".to_string()),
            "en",
        );

        artifact.deprecate();

        assert_eq!(artifact.status, ArtifactStatus::Deprecated);
        assert!(!artifact.is_published);
        assert!(!artifact.is_visible());
    }

    #[test]
    fn test_version_defaults_to_one_on_old_documents() {
        // Serialized before the version/status fields existed
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "kind": "summary",
            "title": "Legacy",
            "body": { "format": "text", "data": "old content" },
            "language": "en",
            "generated_at": "2024-01-01T00:00:00Z"
        }"#;

        let artifact: Artifact = serde_json::from_str(json).unwrap();
        assert_eq!(artifact.version, 1);
        assert_eq!(artifact.status, ArtifactStatus::Published);
        assert!(artifact.is_published);
    }

    #[test]
    fn test_content_kind_round_trip() {
        for kind in ContentKind::all() {
            let parsed: ContentKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert!("screenplay".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_body_serialization() {
        let body = ArtifactBody::Quiz(vec![QuizQuestion {
            question: "What is ownership?".to_string(),
            options: vec!["A".to_string(), "B".to_string()],
            answer_index: 0,
            explanation: None,
        }]);

        let json = serde_json::to_string(&body).unwrap();
        let parsed: ArtifactBody = serde_json::from_str(&json).unwrap();

        match parsed {
            ArtifactBody::Quiz(questions) => assert_eq!(questions.len(), 1),
            other => panic!("expected quiz body, got {:?}", other),
        }
    }

    #[test]
    fn test_fingerprint_consistency() {
        let a = fingerprint("source text");
        let b = fingerprint("source text");
        let c = fingerprint("other text");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }
}
