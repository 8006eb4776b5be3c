//! Repository for database operations
//!
//! Provides the data access surface the pipeline needs: recent-memory
//! reads, durable memory appends, and pgvector similarity search over
//! passages.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, Statement,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result row from passage similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageHit {
    pub passage_id: Uuid,
    pub source: String,
    pub page: i32,
    pub content: String,
    pub score: f64,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Memory Operations
    // ========================================================================

    /// Fetch the most recent memory entries, newest first.
    ///
    /// When `user_id` is present the result is restricted to that user's
    /// entries; otherwise the store-wide most recent entries are returned
    /// (the shared anonymous pool). Equal timestamps are broken by id,
    /// which is time-ordered (UUIDv7), so the order matches insertion
    /// order.
    pub async fn recent_memories(
        &self,
        user_id: Option<Uuid>,
        limit: u64,
    ) -> Result<Vec<MemoryEntry>> {
        let mut query = MemoryEntity::find();

        if let Some(uid) = user_id {
            query = query.filter(MemoryColumn::UserId.eq(uid));
        }

        query
            .order_by_desc(MemoryColumn::CreatedAt)
            .order_by_desc(MemoryColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Append one memory entry. The insert is committed before this
    /// returns, so a successful return means the turn is durable.
    pub async fn append_memory(
        &self,
        content: &str,
        user_id: Option<Uuid>,
        role: MemoryRole,
        tier: MemoryTier,
    ) -> Result<MemoryEntry> {
        let entry = MemoryActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            role: Set(String::from(role)),
            memory_type: Set(String::from(tier)),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().into()),
            last_accessed: Set(None),
        };

        entry.insert(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // Passage Operations
    // ========================================================================

    /// Vector similarity search over passages, nearest first.
    ///
    /// Zero matches is an empty result, not an error.
    pub async fn search_passages(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<PassageHit>> {
        // Convert Vec<f32> to pgvector string format "[1.0,2.0,...]"
        let embedding_str = format!(
            "[{}]",
            embedding.iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(",")
        );

        let sql = r#"
            SELECT
                p.id as passage_id,
                p.source,
                p.page,
                p.content,
                1 - (p.embedding <=> $1::vector) as score
            FROM passages p
            WHERE p.embedding IS NOT NULL
            ORDER BY p.embedding <=> $1::vector
            LIMIT $2
            "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            vec![embedding_str.into(), (limit as i32).into()],
        );

        use sea_orm::ConnectionTrait;
        let results = self.read_conn()
            .query_all(stmt)
            .await?
            .into_iter()
            .filter_map(|row| {
                Some(PassageHit {
                    passage_id: row.try_get_by_index::<Uuid>(0).ok()?,
                    source: row.try_get_by_index::<String>(1).ok()?,
                    page: row.try_get_by_index::<i32>(2).ok()?,
                    content: row.try_get_by_index::<String>(3).ok()?,
                    score: row.try_get_by_index::<f64>(4).ok()?,
                })
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_literal_format() {
        let embedding = vec![0.1_f32, 0.2, 0.3];
        let formatted = format!(
            "[{}]",
            embedding.iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
        assert_eq!(formatted, "[0.1,0.2,0.3]");
    }

    #[test]
    fn test_v7_ids_are_insertion_ordered() {
        let a = Uuid::now_v7();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = Uuid::now_v7();
        assert!(a < b);
    }
}
