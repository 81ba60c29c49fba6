//! Per-request coordination.
//!
//! `AskEngine` owns the long-lived service handles and drives one request
//! through the safety screen, best-effort retrieval, prompt composition,
//! the generation fallback chain, and a best-effort interaction write.
//! Components are injected as trait objects so tests can substitute fakes.

use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, GeminiEmbedder};
use crate::error::{Result, YogiError};
use crate::gemini::GeminiClient;
use crate::generation::{FallbackChain, TextGenerator};
use crate::prompt::{self, ChatTurn};
use crate::retrieval::{PineconeIndex, PoseSource, RetrievedContext, Retriever};
use crate::safety;
use crate::store::{InteractionLog, InteractionStore, SqliteStore, AUDIO_QUERY_PLACEHOLDER};
use base64::Engine as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Env var holding the generative-language API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Env var holding the vector index API key.
pub const PINECONE_API_KEY_ENV: &str = "PINECONE_API_KEY";

/// One incoming question.
#[derive(Debug, Clone, Default)]
pub struct AskInput {
    /// Query text; may be absent for audio requests.
    pub query: Option<String>,
    /// Recent conversation turns, oldest first.
    pub history: Vec<ChatTurn>,
    /// Base64-encoded audio payload, if this is a voice request.
    pub audio: Option<String>,
}

/// The answer and its provenance for one request.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub answer: String,
    pub sources: Vec<PoseSource>,
    pub is_unsafe: bool,
    pub safety_flags: Vec<String>,
}

/// The request-handling engine.
pub struct AskEngine {
    prompts: Prompts,
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
    chain: FallbackChain,
    store: Arc<dyn InteractionStore>,
}

impl AskEngine {
    /// Create an engine with injected components.
    pub fn new(
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn crate::retrieval::VectorIndex>,
        generator: Arc<dyn TextGenerator>,
        chain: FallbackChain,
        store: Arc<dyn InteractionStore>,
        top_k: usize,
    ) -> Self {
        Self {
            prompts,
            retriever: Retriever::new(embedder, index, top_k),
            generator,
            chain,
            store,
        }
    }

    /// Build the engine and its long-lived clients from settings and env.
    ///
    /// Clients are stateless with respect to request data and shared across
    /// concurrent requests.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let gemini_key = require_env(GEMINI_API_KEY_ENV)?;
        let pinecone_key = require_env(PINECONE_API_KEY_ENV)?;

        let generation_client = GeminiClient::new(
            &gemini_key,
            Duration::from_secs(settings.generation.timeout_secs),
        )?;
        let embedding_client = GeminiClient::new(
            &gemini_key,
            Duration::from_secs(settings.embedding.timeout_secs),
        )?;

        let embedder = Arc::new(GeminiEmbedder::new(
            embedding_client,
            &settings.embedding.model,
        ));
        let index = Arc::new(PineconeIndex::new(
            &settings.retrieval.index_host,
            &pinecone_key,
            Duration::from_secs(settings.retrieval.timeout_secs),
        )?);
        let store = Arc::new(SqliteStore::new(&settings.sqlite_path())?);

        Ok(Self::new(
            Prompts::default(),
            embedder,
            index,
            Arc::new(generation_client),
            FallbackChain::new(settings.generation.models.clone()),
            store,
            settings.retrieval.top_k,
        ))
    }

    /// Answer one question.
    ///
    /// Retrieval and persistence failures degrade gracefully; only an
    /// exhausted fallback chain (or invalid input) is an error.
    #[instrument(skip(self, input))]
    pub async fn ask(&self, input: AskInput) -> Result<AskOutcome> {
        let query = input.query.unwrap_or_default();

        if input.audio.is_none() && query.is_empty() {
            return Err(YogiError::InvalidInput(
                "either a query or an audio payload is required".to_string(),
            ));
        }

        if let Some(audio) = &input.audio {
            base64::engine::general_purpose::STANDARD
                .decode(audio)
                .map_err(|e| YogiError::InvalidInput(format!("audio is not valid base64: {}", e)))?;
            debug!("Audio payload present ({} base64 chars)", audio.len());
        }

        // 1. Keyword safety screen (skips empty text and the voice sentinel).
        let report = safety::screen(&query);

        // 2. Best-effort retrieval.
        let retrieved = if Retriever::applies_to(&query) {
            match self.retriever.retrieve(&query).await {
                Ok(retrieved) => retrieved,
                Err(e) => {
                    warn!("Retrieval failed, continuing without context: {}", e);
                    RetrievedContext::default()
                }
            }
        } else {
            RetrievedContext::default()
        };

        // 3. Prompt composition.
        let instruction =
            prompt::system_instruction(&self.prompts, &retrieved.context, report.is_unsafe);
        let parts = prompt::compose_parts(
            &self.prompts,
            &instruction,
            &input.history,
            &query,
            input.audio.as_deref(),
        );

        // 4. Generation with fallback. This is the only fatal path.
        let answer = self.chain.generate(self.generator.as_ref(), parts).await?;

        // 5. Best-effort persistence, awaited before the response is sent.
        let logged_query = if query.is_empty() {
            AUDIO_QUERY_PLACEHOLDER.to_string()
        } else {
            query
        };
        let log = InteractionLog::new(
            logged_query,
            answer.clone(),
            retrieved.sources.clone(),
            report.is_unsafe,
            report.flags.clone(),
        );
        if let Err(e) = self.store.record(&log).await {
            warn!("Failed to record interaction: {}", e);
        }

        Ok(AskOutcome {
            answer,
            sources: retrieved.sources,
            is_unsafe: report.is_unsafe,
            safety_flags: report.flags,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(YogiError::Config(format!("{} is not set", name))),
    }
}
