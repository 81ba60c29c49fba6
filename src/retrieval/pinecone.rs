//! Pinecone-backed vector index implementation.
//!
//! Talks to the index's query endpoint directly: POST /query with the
//! embedding, top-K and a metadata flag, authenticated by the Api-Key header.

use super::{PoseMatch, VectorIndex};
use crate::error::{Result, YogiError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Debug, Deserialize)]
struct Match {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
}

/// Vector index client for a Pinecone index.
pub struct PineconeIndex {
    http: reqwest::Client,
    query_url: String,
    api_key: String,
}

impl PineconeIndex {
    /// Create a client for the given index host
    /// (e.g. "yoga-gemini-abc123.svc.us-east-1.pinecone.io").
    pub fn new(index_host: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| YogiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let host = index_host.trim_end_matches('/');
        let query_url = if host.starts_with("http") {
            format!("{}/query", host)
        } else {
            format!("https://{}/query", host)
        };

        Ok(Self {
            http,
            query_url,
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, vector), fields(top_k = top_k))]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<PoseMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self
            .http
            .post(&self.query_url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YogiError::VectorIndex(format!(
                "index returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: QueryResponse = response.json().await?;
        debug!("Index returned {} matches", parsed.matches.len());

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| PoseMatch {
                id: m.id,
                title: m.metadata.title,
                text: m.metadata.text,
                score: m.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_wire_shape() {
        let vector = vec![0.1_f32, 0.2];
        let request = QueryRequest {
            vector: &vector,
            top_k: 2,
            include_metadata: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 2);
        assert_eq!(json["includeMetadata"], true);
        assert!(json["vector"].is_array());
    }

    #[test]
    fn test_response_missing_matches_defaults_empty() {
        let parsed: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.matches.is_empty());
    }

    #[test]
    fn test_match_metadata_mapping() {
        let raw = serde_json::json!({
            "matches": [
                {
                    "id": "pose-7",
                    "score": 0.87,
                    "metadata": { "title": "Warrior II", "text": "A standing pose." }
                }
            ]
        });
        let parsed: QueryResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.matches[0].id, "pose-7");
        assert_eq!(parsed.matches[0].metadata.title, "Warrior II");
    }
}
