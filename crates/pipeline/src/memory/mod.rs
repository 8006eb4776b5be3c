//! Conversational memory store
//!
//! Durable, append-only log of past turns. Reads come back
//! most-recent-first; the composer is responsible for putting them in
//! chronological order before they reach the prompt.

use async_trait::async_trait;
use griot_common::db::models::{MemoryRole, MemoryTier};
use griot_common::db::Repository;
use griot_common::errors::{AppError, Result};
use uuid::Uuid;

/// Trait for conversational memory access
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Fetch up to `limit` most recent turn contents, newest first.
    ///
    /// Scoped to `user_id` when present; store-wide (the shared anonymous
    /// pool) otherwise.
    async fn fetch_recent(&self, user_id: Option<Uuid>, limit: u64) -> Result<Vec<String>>;

    /// Append one turn. Durable (committed) before returning success.
    async fn append(
        &self,
        content: &str,
        user_id: Option<Uuid>,
        role: MemoryRole,
        tier: MemoryTier,
    ) -> Result<()>;
}

/// Postgres-backed memory store
pub struct PgMemoryStore {
    repo: Repository,
}

impl PgMemoryStore {
    /// Create a new store over the shared repository
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl MemoryStore for PgMemoryStore {
    async fn fetch_recent(&self, user_id: Option<Uuid>, limit: u64) -> Result<Vec<String>> {
        let entries = self
            .repo
            .recent_memories(user_id, limit)
            .await
            .map_err(|e| AppError::MemoryUnavailable {
                message: format!("recent-memory query failed: {}", e),
            })?;

        Ok(entries.into_iter().map(|entry| entry.content).collect())
    }

    async fn append(
        &self,
        content: &str,
        user_id: Option<Uuid>,
        role: MemoryRole,
        tier: MemoryTier,
    ) -> Result<()> {
        self.repo
            .append_memory(content, user_id, role, tier)
            .await
            .map_err(|e| AppError::MemoryWriteFailed {
                message: format!("memory append failed: {}", e),
            })?;

        Ok(())
    }
}
