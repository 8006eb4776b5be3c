//! Griot Common Library
//!
//! Shared code for the Griot answering service:
//! - Database models and repository
//! - Embedding client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod embeddings;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{PassageHit, Repository};
pub use embeddings::Embedder;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Default embedding dimension
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
