//! Configuration module for Yogi.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::Prompts;
pub use settings::{
    EmbeddingSettings, GenerationSettings, RetrievalSettings, ServerSettings, Settings,
    StoreSettings,
};
