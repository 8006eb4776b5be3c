//! Configuration management for the Griot service
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values
//!
//! Every collaborator the pipeline depends on (database, embedder,
//! generator) is configured here once at startup; nothing is re-created
//! per request.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Passage retrieval configuration
    pub retrieval: RetrievalConfig,

    /// Embedding service configuration
    pub embedding: EmbeddingConfig,

    /// Generative model configuration
    pub generation: GenerationConfig,

    /// Conversational memory configuration
    pub memory: MemoryConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Number of passages fetched per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: openai, mock
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for embedding service
    pub api_key: Option<String>,

    /// API base URL (for self-hosted OpenAI-compatible endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Generation provider: gemini, mock
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    /// API key for the hosted model
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_generation_base")]
    pub api_base: String,

    /// Model identifier
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Sampling temperature (low, favoring determinism)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Number of recent turns fed into each prompt
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u64,

    /// Scope for requests without a user id: "shared" reads and writes the
    /// store-wide anonymous pool, "disabled" makes anonymous requests
    /// stateless
    #[serde(default = "default_anonymous_scope")]
    pub anonymous_scope: AnonymousScope,
}

/// Memory behavior for requests carrying no user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymousScope {
    /// All anonymous requests share one global memory pool
    Shared,
    /// Anonymous requests neither read nor write memory
    Disabled,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 60 }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_top_k() -> usize { 4 }
fn default_embedding_provider() -> String { "openai".to_string() }
fn default_embedding_model() -> String { crate::DEFAULT_EMBEDDING_MODEL.to_string() }
fn default_embedding_dimension() -> usize { crate::DEFAULT_EMBEDDING_DIMENSION }
fn default_embedding_timeout() -> u64 { 30 }
fn default_embedding_retries() -> u32 { 3 }
fn default_generation_provider() -> String { "gemini".to_string() }
fn default_generation_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_generation_model() -> String { "gemini-2.5-flash".to_string() }
fn default_temperature() -> f32 { 0.2 }
fn default_max_output_tokens() -> u32 { 1024 }
fn default_generation_timeout() -> u64 { 30 }
fn default_recent_limit() -> u64 { 5 }
fn default_anonymous_scope() -> AnonymousScope { AnonymousScope::Shared }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "griot".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__GENERATION__API_KEY=...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get generation timeout as Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs)
    }

    /// Get the read database URL (falls back to primary)
    pub fn read_database_url(&self) -> &str {
        self.database.read_url.as_deref().unwrap_or(&self.database.url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/griot".to_string(),
                read_url: None,
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
            },
            retrieval: RetrievalConfig {
                top_k: default_top_k(),
            },
            embedding: EmbeddingConfig {
                provider: default_embedding_provider(),
                api_key: None,
                api_base: None,
                model: default_embedding_model(),
                dimension: default_embedding_dimension(),
                timeout_secs: default_embedding_timeout(),
                max_retries: default_embedding_retries(),
            },
            generation: GenerationConfig {
                provider: default_generation_provider(),
                api_key: None,
                api_base: default_generation_base(),
                model: default_generation_model(),
                temperature: default_temperature(),
                max_output_tokens: default_max_output_tokens(),
                timeout_secs: default_generation_timeout(),
            },
            memory: MemoryConfig {
                recent_limit: default_recent_limit(),
                anonymous_scope: default_anonymous_scope(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.memory.recent_limit, 5);
        assert_eq!(config.generation.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_generation_defaults_favor_determinism() {
        let config = AppConfig::default();
        assert!(config.generation.temperature <= 0.3);
        assert_eq!(config.generation_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_anonymous_scope_default_is_shared() {
        let config = AppConfig::default();
        assert_eq!(config.memory.anonymous_scope, AnonymousScope::Shared);
    }

    #[test]
    fn test_read_database_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.read_database_url(), "postgres://localhost/griot");
    }
}
