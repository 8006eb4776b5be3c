//! Error types for the Griot answering service
//!
//! Provides:
//! - Distinct error types for each pipeline failure mode
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling
//!
//! Only generation failures change the user-visible outcome of a request;
//! retrieval and memory failures are absorbed by the orchestrator and
//! degrade gracefully. The distinct variants exist so those degradations
//! stay distinguishable in logs and metrics.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // External service / pipeline errors (8xxx)
    RetrievalUnavailable,
    EmbeddingError,
    GenerationFailed,
    GenerationTimeout,
    MemoryUnavailable,
    MemoryWriteFailed,
    UpstreamError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,

    // Service unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            // External / pipeline (8xxx)
            ErrorCode::RetrievalUnavailable => 8001,
            ErrorCode::EmbeddingError => 8002,
            ErrorCode::GenerationFailed => 8003,
            ErrorCode::GenerationTimeout => 8004,
            ErrorCode::MemoryUnavailable => 8005,
            ErrorCode::MemoryWriteFailed => 8006,
            ErrorCode::UpstreamError => 8007,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,

            ErrorCode::ServiceUnavailable => 9999,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    // Pipeline errors
    #[error("Vector index unavailable: {message}")]
    RetrievalUnavailable { message: String },

    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    #[error("Generation failed: {message}")]
    GenerationFailed { message: String },

    #[error("Generation timed out after {timeout_ms}ms")]
    GenerationTimeout { timeout_ms: u64 },

    #[error("Memory store unavailable: {message}")]
    MemoryUnavailable { message: String },

    #[error("Memory write failed: {message}")]
    MemoryWriteFailed { message: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::RetrievalUnavailable { .. } => ErrorCode::RetrievalUnavailable,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::GenerationFailed { .. } => ErrorCode::GenerationFailed,
            AppError::GenerationTimeout { .. } => ErrorCode::GenerationTimeout,
            AppError::MemoryUnavailable { .. } => ErrorCode::MemoryUnavailable,
            AppError::MemoryWriteFailed { .. } => ErrorCode::MemoryWriteFailed,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } |
            AppError::MissingField { .. } => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            AppError::Database(_) |
            AppError::DatabaseConnection { .. } |
            AppError::Internal { .. } |
            AppError::Configuration { .. } |
            AppError::Serialization(_) |
            AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::RetrievalUnavailable { .. } |
            AppError::EmbeddingError { .. } |
            AppError::GenerationFailed { .. } |
            AppError::GenerationTimeout { .. } |
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            AppError::MemoryUnavailable { .. } |
            AppError::MemoryWriteFailed { .. } |
            AppError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Check if this error is recoverable inside the pipeline without
    /// changing the user-visible answer
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            AppError::RetrievalUnavailable { .. }
                | AppError::EmbeddingError { .. }
                | AppError::MemoryUnavailable { .. }
                | AppError::MemoryWriteFailed { .. }
        )
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                request_id: None, // Filled by middleware
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::GenerationFailed { message: "model down".into() };
        assert_eq!(err.code(), ErrorCode::GenerationFailed);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_degradable_errors() {
        let retrieval = AppError::RetrievalUnavailable { message: "index down".into() };
        let memory = AppError::MemoryUnavailable { message: "store down".into() };
        let write = AppError::MemoryWriteFailed { message: "insert failed".into() };
        let generation = AppError::GenerationFailed { message: "quota".into() };

        assert!(retrieval.is_degradable());
        assert!(memory.is_degradable());
        assert!(write.is_degradable());
        assert!(!generation.is_degradable());
    }

    #[test]
    fn test_timeout_is_not_degradable() {
        // A generator timeout ends the answer path just like any other
        // generation failure.
        let err = AppError::GenerationTimeout { timeout_ms: 30_000 };
        assert!(!err.is_degradable());
        assert_eq!(err.code().as_code(), 8004);
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation {
            message: "Empty question".into(),
            field: Some("question".into()),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }
}
