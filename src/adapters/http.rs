//! HTTP generator backed by an OpenAI-compatible chat completions API.
//!
//! Sends the per-kind instruction prompt plus the resolved source text and
//! parses the reply into a typed artifact body.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ArtifactBody, ContentKind};

use super::{instructions_for, parse, GenerateError, Generator};

/// Default request timeout for generation calls
const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Chat-completions generator client
pub struct HttpGenerator {
    /// API base URL (e.g. "https://api.openai.com/v1")
    base_url: String,
    /// Bearer token
    api_key: String,
    /// Model identifier
    model: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Configuration for the HTTP generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpGeneratorConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_key_env() -> String {
    "REFRACT_API_KEY".to_string()
}

impl Default for HttpGeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

impl HttpGenerator {
    /// Create a new generator client
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create from config, reading the API key from the configured env var
    pub fn from_config(config: &HttpGeneratorConfig) -> Result<Self, GenerateError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GenerateError::backend(format!(
                "API key env var '{}' is not set",
                config.api_key_env
            ))
        })?;

        Ok(Self::new(&config.base_url, api_key, &config.model))
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Issue one chat-completions call and return the raw model text
    async fn complete(&self, instructions: &str, source_text: &str) -> Result<String, GenerateError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instructions,
                },
                ChatMessage {
                    role: "user",
                    content: source_text,
                },
            ],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::backend(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::backend(format!(
                "generator returned {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::backend(format!("invalid response body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerateError::EmptyOutput);
        }

        Ok(content)
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(
        &self,
        kind: ContentKind,
        source_text: &str,
        language: &str,
    ) -> Result<ArtifactBody, GenerateError> {
        let instructions = instructions_for(kind, language);
        let raw = self.complete(&instructions, source_text).await?;
        parse::parse_body(kind, &raw)
    }

    async fn health_check(&self) -> Result<(), GenerateError> {
        let response = self
            .client
            .get(self.api_url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GenerateError::backend(format!("health check failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(GenerateError::backend(format!(
                "health check returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
