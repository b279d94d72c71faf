//! Programs and their source assets.
//!
//! A Program is the top-level persisted aggregate: metadata plus an ordered
//! collection of assets, each owning its generated-content history. All
//! writes go through whole-aggregate read-modify-write at the store layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Entity, Error, Result};

use super::artifact::{Artifact, ArtifactBody, ContentKind};

/// Top-level aggregate grouping assets and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Unique identifier
    pub id: Uuid,

    /// Program title
    pub title: String,

    /// Longer description
    #[serde(default)]
    pub description: String,

    /// Free-form tags (deduplicated, order-preserving)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Language codes this program supports
    #[serde(default)]
    pub languages: Vec<String>,

    /// Whether the program is visible to learners
    #[serde(default)]
    pub is_published: bool,

    /// When the program was created
    pub created_at: DateTime<Utc>,

    /// Refreshed on every persisted mutation
    pub updated_at: DateTime<Utc>,

    /// Owning user reference
    pub owner: String,

    /// Source assets, in upload order
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Program {
    /// Create a new program
    pub fn new(title: impl Into<String>, owner: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            languages: vec!["en".to_string()],
            is_published: false,
            created_at: now,
            updated_at: now,
            owner: owner.into(),
            assets: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a tag (ignored if already present)
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Add multiple tags
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for tag in tags {
            self = self.with_tag(tag);
        }
        self
    }

    /// Replace the supported language list
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Refresh the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Attach an asset
    pub fn add_asset(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    /// Find an asset by id
    pub fn asset(&self, asset_id: Uuid) -> Result<&Asset> {
        self.assets
            .iter()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| Error::not_found(Entity::Asset, asset_id))
    }

    /// Find an asset by id, mutably
    pub fn asset_mut(&mut self, asset_id: Uuid) -> Result<&mut Asset> {
        self.assets
            .iter_mut()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| Error::not_found(Entity::Asset, asset_id))
    }

    /// Find an artifact by id within an asset
    pub fn artifact(&self, asset_id: Uuid, artifact_id: Uuid) -> Result<&Artifact> {
        self.asset(asset_id)?.artifact(artifact_id)
    }

    /// Case-insensitive substring match over title, description, and tags
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

/// A source content item attached to a program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier
    pub id: Uuid,

    /// What kind of source this is
    pub kind: AssetKind,

    /// Display title
    pub title: String,

    /// Inline content (text assets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Source URL (video assets) or file path (document assets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Size in bytes, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// MIME type, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// When the asset was attached
    pub uploaded_at: DateTime<Utc>,

    /// Generated-content history, in append order
    #[serde(default)]
    pub generated: Vec<Artifact>,
}

impl Asset {
    /// Create a video asset from a URL
    pub fn video(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: AssetKind::Video,
            title: title.into(),
            content: None,
            url: Some(url.into()),
            size_bytes: None,
            mime_type: None,
            uploaded_at: Utc::now(),
            generated: Vec::new(),
        }
    }

    /// Create a text asset with inline content
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4(),
            kind: AssetKind::Text,
            title: title.into(),
            size_bytes: Some(content.len() as u64),
            content: Some(content),
            url: None,
            mime_type: Some("text/plain".to_string()),
            uploaded_at: Utc::now(),
            generated: Vec::new(),
        }
    }

    /// Create a document asset pointing at an uploaded file
    pub fn document(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: AssetKind::Document,
            title: title.into(),
            content: None,
            url: Some(path.into()),
            size_bytes: None,
            mime_type: None,
            uploaded_at: Utc::now(),
            generated: Vec::new(),
        }
    }

    /// Set size/mime metadata
    pub fn with_metadata(mut self, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        self.size_bytes = Some(size_bytes);
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Find an artifact by id
    pub fn artifact(&self, artifact_id: Uuid) -> Result<&Artifact> {
        self.generated
            .iter()
            .find(|a| a.id == artifact_id)
            .ok_or_else(|| Error::not_found(Entity::Artifact, artifact_id))
    }

    /// Append a freshly generated artifact. Siblings are untouched; this is
    /// the first-time-generation path.
    pub fn append_artifact(&mut self, artifact: Artifact) {
        self.generated.push(artifact);
    }

    /// Highest version among artifacts sharing the given (kind, language)
    /// key. Zero when none exist.
    pub fn max_version(&self, kind: ContentKind, language: &str) -> u32 {
        self.generated
            .iter()
            .filter(|a| a.key() == (kind, language))
            .map(|a| a.version)
            .max()
            .unwrap_or(0)
    }

    /// Supersede an existing artifact with a new body.
    ///
    /// The existing artifact is deprecated in place (located by index, then
    /// updated, so no aliasing during traversal) and a successor with
    /// `version = max(key versions) + 1` is appended. Returns the successor.
    pub fn supersede_artifact(
        &mut self,
        existing_id: Uuid,
        new_body: ArtifactBody,
    ) -> Result<&mut Artifact> {
        let index = self
            .generated
            .iter()
            .position(|a| a.id == existing_id)
            .ok_or_else(|| Error::not_found(Entity::Artifact, existing_id))?;

        let existing = &self.generated[index];
        let next_version = self.max_version(existing.kind, &existing.language) + 1;

        let successor = existing.successor(new_body, next_version);
        self.generated[index].deprecate();
        self.generated.push(successor);

        let last = self.generated.len() - 1;
        Ok(&mut self.generated[last])
    }
}

/// Kinds of source assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Linked video (e.g. a YouTube URL)
    Video,

    /// Inline text
    Text,

    /// Uploaded document
    Document,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Video => write!(f, "video"),
            AssetKind::Text => write!(f, "text"),
            AssetKind::Document => write!(f, "document"),
        }
    }
}

impl std::str::FromStr for AssetKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "video" => Ok(AssetKind::Video),
            "text" => Ok(AssetKind::Text),
            "document" | "doc" | "file" => Ok(AssetKind::Document),
            _ => anyhow::bail!("Unknown asset kind: {}", s),
        }
    }
}
