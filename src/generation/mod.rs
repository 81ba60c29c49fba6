//! Model fallback orchestration.
//!
//! Candidates are tried strictly in priority order. The first success wins
//! and later candidates are never invoked; a failed candidate is logged and
//! the next one is tried. There are no same-candidate retries, no backoff
//! and no racing.

use crate::error::{ModelFailure, Result, YogiError};
use crate::gemini::{GeminiClient, Part};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Trait for a single generation attempt against one model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text from composed content parts using the given model.
    async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String>;
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, parts: Vec<Part>) -> Result<String> {
        self.generate_content(model, parts).await
    }
}

/// Ordered fallback chain over candidate model identifiers.
pub struct FallbackChain {
    models: Vec<String>,
}

impl FallbackChain {
    /// Create a chain from candidates in priority order (first = preferred).
    pub fn new(models: Vec<String>) -> Self {
        Self { models }
    }

    /// The candidate list, in order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Try each candidate in order until one succeeds.
    ///
    /// Returns the first successful text. If every candidate fails, returns
    /// [`YogiError::AllModelsFailed`] carrying the per-candidate reasons;
    /// those reasons are for operator logs, not for the caller's response.
    #[instrument(skip(self, generator, parts), fields(candidates = self.models.len()))]
    pub async fn generate(
        &self,
        generator: &dyn TextGenerator,
        parts: Vec<Part>,
    ) -> Result<String> {
        let mut failures = Vec::new();

        for model in &self.models {
            match generator.generate(model, parts.clone()).await {
                Ok(text) => {
                    info!("Generated answer via {}", model);
                    return Ok(text);
                }
                Err(e) => {
                    warn!("{} failed: {}", model, e);
                    failures.push(ModelFailure {
                        model: model.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(YogiError::AllModelsFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted generator: fails for models in `failing`, succeeds
    /// otherwise, and records every invocation in order.
    struct ScriptedGenerator {
        failing: Vec<&'static str>,
        invoked: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                invoked: Mutex::new(Vec::new()),
            }
        }

        fn invocations(&self) -> Vec<String> {
            self.invoked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, model: &str, _parts: Vec<Part>) -> Result<String> {
            self.invoked.lock().unwrap().push(model.to_string());
            if self.failing.contains(&model) {
                Err(YogiError::Generation(format!("{} quota exceeded", model)))
            } else {
                Ok(format!("answer from {}", model))
            }
        }
    }

    fn chain(models: &[&str]) -> FallbackChain {
        FallbackChain::new(models.iter().map(|m| m.to_string()).collect())
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let generator = ScriptedGenerator::new(vec![]);
        let chain = chain(&["model-a", "model-b"]);

        let text = chain
            .generate(&generator, vec![Part::text("hi")])
            .await
            .unwrap();
        assert_eq!(text, "answer from model-a");
        assert_eq!(generator.invocations(), vec!["model-a"]);
    }

    #[tokio::test]
    async fn test_advances_past_failures_in_order() {
        let generator = ScriptedGenerator::new(vec!["model-a", "model-b"]);
        let chain = chain(&["model-a", "model-b", "model-c", "model-d"]);

        let text = chain
            .generate(&generator, vec![Part::text("hi")])
            .await
            .unwrap();
        assert_eq!(text, "answer from model-c");
        // model-d is never reached once model-c succeeds.
        assert_eq!(
            generator.invocations(),
            vec!["model-a", "model-b", "model-c"]
        );
    }

    #[tokio::test]
    async fn test_all_failed_carries_per_candidate_reasons() {
        let generator = ScriptedGenerator::new(vec!["model-a", "model-b", "model-c"]);
        let chain = chain(&["model-a", "model-b", "model-c"]);

        let err = chain
            .generate(&generator, vec![Part::text("hi")])
            .await
            .unwrap_err();
        match err {
            YogiError::AllModelsFailed(failures) => {
                assert_eq!(failures.len(), 3);
                assert_eq!(failures[0].model, "model-a");
                assert!(failures[0].reason.contains("quota exceeded"));
                assert_eq!(failures[2].model, "model-c");
            }
            other => panic!("expected AllModelsFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_each_candidate_tried_exactly_once() {
        let generator = ScriptedGenerator::new(vec!["model-a", "model-b"]);
        let chain = chain(&["model-a", "model-b"]);

        let _ = chain.generate(&generator, vec![Part::text("hi")]).await;
        assert_eq!(generator.invocations(), vec!["model-a", "model-b"]);
    }
}
