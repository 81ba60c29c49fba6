//! Vector index querying and context assembly.
//!
//! The pose knowledge base lives in an external vector index. Retrieval is
//! best-effort: callers treat any failure here as "no context" rather than
//! failing the request.

mod pinecone;

pub use pinecone::PineconeIndex;

use crate::embedding::Embedder;
use crate::error::Result;
use crate::safety::VOICE_QUERY_SENTINEL;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// One nearest-neighbor match from the index.
#[derive(Debug, Clone)]
pub struct PoseMatch {
    /// Index record id.
    pub id: String,
    /// Pose title from metadata.
    pub title: String,
    /// Pose description text from metadata.
    pub text: String,
    /// Similarity score reported by the index.
    pub score: f32,
}

/// A citation returned to the caller and persisted with the interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoseSource {
    pub title: String,
    pub id: String,
}

/// Context assembled from the top-K matches for one query.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    /// Match texts joined with blank lines, ready for prompt injection.
    pub context: String,
    /// Citations in match-rank order.
    pub sources: Vec<PoseSource>,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query the top-K nearest neighbors for an embedding.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<PoseMatch>>;
}

/// Retrieves pose context for a query: embed, query top-K, map metadata.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over an embedder and index.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    /// Whether retrieval applies to this query at all. Empty queries and
    /// the voice sentinel have nothing to embed.
    pub fn applies_to(query: &str) -> bool {
        !query.is_empty() && query != VOICE_QUERY_SENTINEL
    }

    /// Retrieve context for a query.
    ///
    /// Errors from the embedding service or the index propagate; the engine
    /// decides whether they are fatal (they are not).
    #[instrument(skip(self, query))]
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedContext> {
        let vector = self.embedder.embed(query).await?;
        let matches = self.index.query(&vector, self.top_k).await?;

        debug!("Retrieved {} matches", matches.len());

        let context = matches
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let sources = matches
            .into_iter()
            .map(|m| PoseSource {
                title: m.title,
                id: m.id,
            })
            .collect();

        Ok(RetrievedContext { context, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YogiError;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    struct FixedIndex {
        matches: Vec<PoseMatch>,
    }

    #[async_trait]
    impl VectorIndex for FixedIndex {
        async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<PoseMatch>> {
            Ok(self.matches.iter().take(top_k).cloned().collect())
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl VectorIndex for FailingIndex {
        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<PoseMatch>> {
            Err(YogiError::VectorIndex("index unreachable".to_string()))
        }
    }

    fn pose(id: &str, title: &str, text: &str) -> PoseMatch {
        PoseMatch {
            id: id.to_string(),
            title: title.to_string(),
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[tokio::test]
    async fn test_context_joined_with_blank_lines() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex {
                matches: vec![
                    pose("pose-1", "Child's Pose", "A resting pose."),
                    pose("pose-2", "Cat-Cow", "A spinal warmup."),
                ],
            }),
            2,
        );

        let retrieved = retriever.retrieve("morning flow").await.unwrap();
        assert_eq!(retrieved.context, "A resting pose.\n\nA spinal warmup.");
        assert_eq!(
            retrieved.sources,
            vec![
                PoseSource {
                    title: "Child's Pose".to_string(),
                    id: "pose-1".to_string()
                },
                PoseSource {
                    title: "Cat-Cow".to_string(),
                    id: "pose-2".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_top_k_limits_matches() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex {
                matches: vec![
                    pose("a", "A", "a"),
                    pose("b", "B", "b"),
                    pose("c", "C", "c"),
                ],
            }),
            2,
        );

        let retrieved = retriever.retrieve("query").await.unwrap();
        assert_eq!(retrieved.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_index_failure_propagates() {
        let retriever = Retriever::new(Arc::new(FixedEmbedder), Arc::new(FailingIndex), 2);
        assert!(retriever.retrieve("query").await.is_err());
    }

    #[test]
    fn test_applies_to() {
        assert!(Retriever::applies_to("morning flow"));
        assert!(!Retriever::applies_to(""));
        assert!(!Retriever::applies_to(VOICE_QUERY_SENTINEL));
    }
}
