//! Chat handler - the transport face of the answering pipeline

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use griot_common::errors::{AppError, Result};

/// Chat request
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    /// Optional user scope; absence means the shared anonymous pool
    pub user_id: Option<Uuid>,
}

/// Chat response
#[derive(Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Answer one question.
///
/// Expected pipeline failures never surface here: the pipeline degrades
/// internally and always produces a string, so this returns 200 for
/// everything except malformed requests.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("question".to_string()),
    })?;

    let answer = state
        .pipeline
        .answer(&request.question, request.user_id)
        .await;

    Ok(Json(ChatResponse { answer }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_question_fails_validation() {
        let request = ChatRequest {
            question: String::new(),
            user_id: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_question_without_user_is_valid() {
        let request = ChatRequest {
            question: "What is autism?".to_string(),
            user_id: None,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_deserializes_without_user_id() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"question": "What is autism?"}"#).unwrap();
        assert_eq!(request.question, "What is autism?");
        assert!(request.user_id.is_none());
    }
}
