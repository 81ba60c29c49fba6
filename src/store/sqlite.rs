//! SQLite-based interaction store implementation.

use super::{InteractionLog, InteractionStore};
use crate::error::{Result, YogiError};
use crate::retrieval::PoseSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS interactions (
    id TEXT PRIMARY KEY,
    user_query TEXT NOT NULL,
    ai_response TEXT NOT NULL,
    retrieved_context TEXT NOT NULL,
    is_unsafe INTEGER NOT NULL,
    safety_flags TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_interactions_created_at ON interactions(created_at);
"#;

/// SQLite-based interaction store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite interaction store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite interaction store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<InteractionLog> {
        let id: String = row.get(0)?;
        let retrieved_context: String = row.get(3)?;
        let safety_flags: String = row.get(5)?;
        let created_at: String = row.get(6)?;

        Ok(InteractionLog {
            id: id.parse().unwrap_or_default(),
            user_query: row.get(1)?,
            ai_response: row.get(2)?,
            retrieved_context: serde_json::from_str::<Vec<PoseSource>>(&retrieved_context)
                .unwrap_or_default(),
            is_unsafe: row.get::<_, i64>(4)? != 0,
            safety_flags: serde_json::from_str::<Vec<String>>(&safety_flags).unwrap_or_default(),
            created_at: created_at
                .parse::<DateTime<Utc>>()
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl InteractionStore for SqliteStore {
    #[instrument(skip(self, log))]
    async fn record(&self, log: &InteractionLog) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| YogiError::Store(format!("Failed to acquire lock: {}", e)))?;

        conn.execute(
            r#"
            INSERT INTO interactions
            (id, user_query, ai_response, retrieved_context, is_unsafe, safety_flags, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.id.to_string(),
                log.user_query,
                log.ai_response,
                serde_json::to_string(&log.retrieved_context)?,
                log.is_unsafe as i64,
                serde_json::to_string(&log.safety_flags)?,
                log.created_at.to_rfc3339(),
            ],
        )?;

        debug!("Recorded interaction {}", log.id);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionLog>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| YogiError::Store(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_query, ai_response, retrieved_context, is_unsafe, safety_flags, created_at
            FROM interactions
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit as i64], Self::row_to_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(logs)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| YogiError::Store(format!("Failed to acquire lock: {}", e)))?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
