//! Passage retrieval via vector similarity
//!
//! Embeds the query, then runs a top-k pgvector search through the shared
//! repository. Read-only; retrieval never writes to the corpus.

use async_trait::async_trait;
use griot_common::db::Repository;
use griot_common::embeddings::Embedder;
use griot_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Retrieved passage with relevance score, nearest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Passage ID
    pub passage_id: Uuid,

    /// Source document identifier
    pub source: String,

    /// Position within the source document
    pub page: i32,

    /// Passage text
    pub content: String,

    /// Similarity score (0.0 - 1.0)
    pub score: f32,
}

/// Trait for passage retrieval
#[async_trait]
pub trait PassageRetriever: Send + Sync {
    /// Retrieve the top-k passages nearest to the query, nearest first.
    ///
    /// Zero matches is an empty result, not an error. An unreachable
    /// index or embedding failure surfaces as
    /// [`AppError::RetrievalUnavailable`]; callers decide whether to
    /// degrade.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>>;
}

/// Vector retriever backed by pgvector
pub struct VectorRetriever {
    repo: Repository,
    embedder: Arc<dyn Embedder>,
}

impl VectorRetriever {
    /// Create a new vector retriever
    pub fn new(repo: Repository, embedder: Arc<dyn Embedder>) -> Self {
        Self { repo, embedder }
    }
}

#[async_trait]
impl PassageRetriever for VectorRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| AppError::RetrievalUnavailable {
                message: format!("query embedding failed: {}", e),
            })?;

        let hits = self
            .repo
            .search_passages(&embedding, k)
            .await
            .map_err(|e| AppError::RetrievalUnavailable {
                message: format!("similarity search failed: {}", e),
            })?;

        Ok(hits
            .into_iter()
            .map(|hit| Passage {
                passage_id: hit.passage_id,
                source: hit.source,
                page: hit.page,
                content: hit.content,
                score: hit.score as f32,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AppError::EmbeddingError {
                message: "endpoint down".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            384
        }
    }

    #[test]
    fn test_embedding_failure_maps_to_retrieval_unavailable() {
        // The orchestrator only distinguishes "retrieval worked" from
        // "retrieval degraded"; embedder faults must arrive as the latter.
        let err = AppError::RetrievalUnavailable {
            message: format!(
                "query embedding failed: {}",
                AppError::EmbeddingError {
                    message: "endpoint down".to_string()
                }
            ),
        };
        assert!(err.is_degradable());
    }

    #[tokio::test]
    async fn test_failing_embedder_surface() {
        let embedder = FailingEmbedder;
        let result = embedder.embed("what is autism").await;
        assert!(result.is_err());
    }
}
