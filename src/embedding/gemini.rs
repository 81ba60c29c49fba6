//! Gemini embeddings implementation.

use super::Embedder;
use crate::error::Result;
use crate::gemini::GeminiClient;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Embedder backed by the generative-language embedding API.
pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
}

impl GeminiEmbedder {
    /// Create an embedder using the given client and model.
    pub fn new(client: GeminiClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let values = self.client.embed_content(&self.model, text).await?;
        debug!("Generated {}-dimension embedding", values.len());
        Ok(values)
    }
}
