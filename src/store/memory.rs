//! In-memory interaction store implementation.
//!
//! Useful for testing.

use super::{InteractionLog, InteractionStore};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory interaction store.
pub struct MemoryStore {
    logs: RwLock<Vec<InteractionLog>>,
}

impl MemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn record(&self, log: &InteractionLog) -> Result<()> {
        let mut logs = self.logs.write().unwrap();
        logs.push(log.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionLog>> {
        let logs = self.logs.read().unwrap();
        Ok(logs.iter().rev().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.logs.read().unwrap().len())
    }
}
