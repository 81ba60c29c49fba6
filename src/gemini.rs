//! Generative-language API client and wire types.
//!
//! Thin typed wrapper over the REST surface: `models/{model}:generateContent`
//! for text generation and `models/{model}:embedContent` for embeddings.
//! One client is built at startup and shared across requests.

use crate::error::{Result, YogiError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// MIME type for inline audio payloads recorded by the voice frontend.
pub const AUDIO_MIME_TYPE: &str = "audio/m4a";

/// Inline binary data carried inside a content part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

/// One part of a content payload: either text or inline binary data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    /// Build a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Build an inline-audio part from base64 data.
    pub fn audio(data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: AUDIO_MIME_TYPE.to_string(),
                data: data.into(),
            },
        }
    }
}

/// A role-tagged sequence of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

/// A safety threshold applied to generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    /// The fixed thresholds every generation call uses: block
    /// medium-and-above for dangerous content.
    pub fn defaults() -> Vec<SafetySetting> {
        vec![SafetySetting {
            category: "HARM_CATEGORY_DANGEROUS_CONTENT".to_string(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        }]
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Client for the generative-language REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client with an explicit per-request timeout.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, timeout)
    }

    /// Create a client against a custom API base URL.
    pub fn with_base_url(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| YogiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Generate text from a single user turn of parts.
    ///
    /// All calls apply the fixed dangerous-content safety threshold. The
    /// generated candidate's text parts are concatenated into one string.
    #[instrument(skip(self, parts), fields(model = %model))]
    pub async fn generate_content(&self, model: &str, parts: Vec<Part>) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            safety_settings: SafetySetting::defaults(),
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YogiError::Generation(format!(
                "{} returned {}: {}",
                model,
                status,
                truncate(&body, 200)
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::Text { text } => Some(text.as_str()),
                        Part::InlineData { .. } => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(YogiError::Generation(format!(
                "{} returned no text candidate",
                model
            )));
        }

        debug!("Generated {} chars via {}", text.len(), model);
        Ok(text)
    }

    /// Request an embedding vector for a text.
    #[instrument(skip(self, text), fields(model = %model))]
    pub async fn embed_content(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/models/{}:embedContent", self.base_url, model);
        let request = EmbedContentRequest {
            content: Content {
                role: None,
                parts: vec![Part::text(text)],
            },
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YogiError::Embedding(format!(
                "embedding API returned {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        let parsed: EmbedContentResponse = response.json().await?;
        if parsed.embedding.values.is_empty() {
            return Err(YogiError::Embedding("Empty embedding response".to_string()));
        }

        Ok(parsed.embedding.values)
    }
}

/// Truncate an error body to a loggable size, on a char boundary.
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
