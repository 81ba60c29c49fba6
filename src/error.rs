//! Error types for Yogi.

use thiserror::Error;

/// Library-level error type for Yogi operations.
#[derive(Error, Debug)]
pub enum YogiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Generation API error: {0}")]
    Generation(String),

    #[error("All candidate models failed")]
    AllModelsFailed(Vec<ModelFailure>),

    #[error("Interaction store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// One failed generation attempt, kept so operators can see why the
/// whole fallback chain was exhausted.
#[derive(Debug, Clone)]
pub struct ModelFailure {
    /// Model identifier that was tried.
    pub model: String,
    /// Why this candidate failed.
    pub reason: String,
}

impl std::fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.model, self.reason)
    }
}

/// Result type alias for Yogi operations.
pub type Result<T> = std::result::Result<T, YogiError>;
