//! Yogi - Yoga Q&A with Retrieval-Augmented Generation
//!
//! A single-endpoint HTTP service that answers yoga questions by combining
//! keyword safety screening, nearest-neighbor retrieval over a pose index,
//! and LLM generation with an ordered model-fallback chain.
//!
//! # Overview
//!
//! One `POST /ask` request flows through:
//! - Safety screening of the query against a fixed keyword list
//! - Retrieval of related pose descriptions from a vector index (best-effort)
//! - Prompt composition (text with recent history, or inline audio)
//! - Generation via an ordered list of candidate models, first success wins
//! - Best-effort persistence of the interaction to a local store
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `safety` - Keyword-based safety screening
//! - `gemini` - Generative-language API client and wire types
//! - `embedding` - Embedding generation
//! - `retrieval` - Vector index querying and context assembly
//! - `prompt` - Prompt composition
//! - `generation` - Model fallback orchestration
//! - `store` - Interaction log persistence
//! - `engine` - Per-request coordination
//! - `server` - HTTP surface
//!
//! # Example
//!
//! ```rust,no_run
//! use yogi::config::Settings;
//! use yogi::engine::AskEngine;
//! use yogi::engine::AskInput;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = AskEngine::from_settings(&settings)?;
//!
//!     let outcome = engine
//!         .ask(AskInput {
//!             query: Some("Suggest a morning flow".to_string()),
//!             history: Vec::new(),
//!             audio: None,
//!         })
//!         .await?;
//!     println!("{}", outcome.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod gemini;
pub mod generation;
pub mod prompt;
pub mod retrieval;
pub mod safety;
pub mod server;
pub mod store;

pub use error::{Result, YogiError};
