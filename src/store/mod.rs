//! Interaction log persistence.
//!
//! Every answered request is persisted as one append-only record. Writes
//! are best-effort with respect to the caller: a failed write is logged
//! and never affects the HTTP response.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::retrieval::PoseSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder stored as the user query for audio-only requests.
pub const AUDIO_QUERY_PLACEHOLDER: &str = "[Audio Request]";

/// One persisted interaction. Created once per answered request, never
/// mutated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionLog {
    /// Record id.
    pub id: Uuid,
    /// The query text, or [`AUDIO_QUERY_PLACEHOLDER`] for audio requests.
    pub user_query: String,
    /// The generated answer.
    pub ai_response: String,
    /// Citations from retrieval, in rank order.
    pub retrieved_context: Vec<PoseSource>,
    /// Whether the safety screen flagged the query.
    pub is_unsafe: bool,
    /// Matched safety keywords, in scan order.
    pub safety_flags: Vec<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl InteractionLog {
    /// Create a record for one answered request.
    pub fn new(
        user_query: String,
        ai_response: String,
        retrieved_context: Vec<PoseSource>,
        is_unsafe: bool,
        safety_flags: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_query,
            ai_response,
            retrieved_context,
            is_unsafe,
            safety_flags,
            created_at: Utc::now(),
        }
    }
}

/// Trait for interaction store implementations.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Append one interaction record.
    async fn record(&self, log: &InteractionLog) -> Result<()>;

    /// Fetch the most recent records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<InteractionLog>>;

    /// Total number of stored records.
    async fn count(&self) -> Result<usize>;
}
