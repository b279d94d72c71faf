//! Best-effort resolution of an asset into generator input text.
//!
//! Resolution never fails a generation call: when metadata cannot be
//! fetched or a file cannot be read, the resolver degrades to a minimal
//! placeholder string and logs the degradation.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::{Asset, AssetKind};

/// Resolves an asset into the source text fed to the generator
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Produce source text for an asset; degraded resolution yields a
    /// placeholder rather than an error
    async fn resolve(&self, asset: &Asset) -> String;
}

/// Default resolver: inline text, video metadata via oEmbed, local files
pub struct DefaultResolver {
    client: reqwest::Client,
}

/// oEmbed metadata payload
#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    provider_name: String,
}

impl Default for DefaultResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch descriptive text about a video from its oEmbed endpoint
    async fn resolve_video(&self, url: &str) -> Option<String> {
        let oembed_url = format!(
            "https://www.youtube.com/oembed?url={}&format=json",
            urlencode(url)
        );

        let response = self.client.get(&oembed_url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }

        let meta: OEmbedResponse = response.json().await.ok()?;
        if meta.title.is_empty() {
            return None;
        }

        let mut text = format!("Video: {}", meta.title);
        if !meta.author_name.is_empty() {
            text.push_str(&format!("\nAuthor: {}", meta.author_name));
        }
        if !meta.provider_name.is_empty() {
            text.push_str(&format!("\nProvider: {}", meta.provider_name));
        }
        text.push_str(&format!("\nURL: {}", url));

        Some(text)
    }

    /// Read an uploaded document from disk
    async fn resolve_document(&self, path: &str) -> Option<String> {
        let content = tokio::fs::read_to_string(path).await.ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[async_trait]
impl SourceResolver for DefaultResolver {
    async fn resolve(&self, asset: &Asset) -> String {
        match asset.kind {
            AssetKind::Text => match asset.content.as_deref() {
                Some(content) if !content.trim().is_empty() => content.to_string(),
                _ => {
                    warn!(asset = %asset.id, "text asset has no content, using placeholder");
                    format!("Text asset: {}", asset.title)
                }
            },

            AssetKind::Video => {
                let Some(url) = asset.url.as_deref() else {
                    warn!(asset = %asset.id, "video asset has no url, using placeholder");
                    return format!("Video asset: {}", asset.title);
                };

                match self.resolve_video(url).await {
                    Some(text) => text,
                    None => {
                        warn!(asset = %asset.id, url, "video metadata fetch failed, using placeholder");
                        format!("Video content: {}", url)
                    }
                }
            }

            AssetKind::Document => {
                let Some(path) = asset.url.as_deref() else {
                    warn!(asset = %asset.id, "document asset has no path, using placeholder");
                    return format!("Document asset: {}", asset.title);
                };

                match self.resolve_document(path).await {
                    Some(text) => text,
                    None => {
                        warn!(asset = %asset.id, path, "document read failed, using placeholder");
                        format!("Document: {} ({})", asset.title, path)
                    }
                }
            }
        }
    }
}

/// Percent-encode a URL for use as a query parameter
fn urlencode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_asset_resolves_inline_content() {
        let resolver = DefaultResolver::new();
        let asset = Asset::text("Notes", "The borrow checker enforces aliasing rules.");

        let text = resolver.resolve(&asset).await;
        assert_eq!(text, "The borrow checker enforces aliasing rules.");
    }

    #[tokio::test]
    async fn test_empty_text_asset_degrades_to_placeholder() {
        let resolver = DefaultResolver::new();
        let mut asset = Asset::text("Empty notes", "");
        asset.content = Some("   ".to_string());

        let text = resolver.resolve(&asset).await;
        assert_eq!(text, "Text asset: Empty notes");
    }

    #[tokio::test]
    async fn test_document_asset_reads_file() {
        let resolver = DefaultResolver::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.txt");
        tokio::fs::write(&path, "Lecture transcript body")
            .await
            .unwrap();

        let asset = Asset::document(path.to_string_lossy(), "Lecture");
        let text = resolver.resolve(&asset).await;
        assert_eq!(text, "Lecture transcript body");
    }

    #[tokio::test]
    async fn test_missing_document_degrades_to_placeholder() {
        let resolver = DefaultResolver::new();
        let asset = Asset::document("/nonexistent/file.txt", "Ghost");

        let text = resolver.resolve(&asset).await;
        assert_eq!(text, "Document: Ghost (/nonexistent/file.txt)");
    }

    #[tokio::test]
    async fn test_video_without_url_degrades_to_placeholder() {
        let resolver = DefaultResolver::new();
        let mut asset = Asset::video("https://example.com", "Clip");
        asset.url = None;

        let text = resolver.resolve(&asset).await;
        assert_eq!(text, "Video asset: Clip");
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(
            urlencode("https://youtube.com/watch?v=abc"),
            "https%3A%2F%2Fyoutube.com%2Fwatch%3Fv%3Dabc"
        );
    }
}
