//! Generator client for the hosted language model
//!
//! Single attempt per request with a bounded timeout, fixed model, and
//! fixed low temperature. Retries, if wanted, belong to a policy wrapping
//! this client, not inside it.

use async_trait::async_trait;
use griot_common::config::GenerationConfig;
use griot_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Trait for answer generation
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for the composed prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model identifier
    fn model_name(&self) -> &str;
}

/// Client for the hosted Gemini `generateContent` API
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    timeout_ms: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationOptions,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationOptions {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiGenerator {
    /// Create a new generator from configuration
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "generation.api_key is required for the gemini provider".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout_ms: config.timeout_secs * 1000,
        })
    }

    fn request_body(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationOptions {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::GenerationTimeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    AppError::GenerationFailed {
                        message: format!("request failed: {}", e),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GenerationFailed {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            AppError::GenerationFailed {
                message: format!("failed to parse response: {}", e),
            }
        })?;

        let text: String = result
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::GenerationFailed {
                message: "empty completion".to_string(),
            });
        }

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Mock generator for testing and keyless development
pub struct MockGenerator {
    model: String,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            model: "mock-generation".to_string(),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        // Echo the question back so keyless development stays debuggable
        let question = prompt
            .rsplit("Question:\n")
            .next()
            .and_then(|tail| tail.split('\n').next())
            .unwrap_or("")
            .trim();

        Ok(format!(
            "Mock answer for: {} [generation API key not configured]",
            question
        ))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create a generator based on configuration
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "gemini" if config.api_key.is_some() => Ok(Arc::new(GeminiGenerator::new(config)?)),
        "gemini" => {
            tracing::warn!("generation.api_key not set, using mock generator");
            Ok(Arc::new(MockGenerator::new()))
        }
        "mock" => Ok(Arc::new(MockGenerator::new())),
        other => {
            tracing::warn!(provider = other, "Unknown generation provider, using mock");
            Ok(Arc::new(MockGenerator::new()))
        }
    }
}
