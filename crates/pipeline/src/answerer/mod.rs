//! Answering orchestrator
//!
//! Sequences one request through the pipeline: memory fetch → passage
//! retrieval → prompt composition → generation → memory persistence. The
//! only component with cross-cutting knowledge of the others, and the
//! owner of all fallback behavior:
//!
//! - memory fetch failure degrades to "no prior memory" and continues;
//! - retrieval failure degrades to "no relevant context" and continues;
//! - generation failure ends the request with a fixed apology string and
//!   skips persistence;
//! - persistence failure never discards the already-produced answer.
//!
//! All failures are per-request; nothing here is fatal to the process.

use crate::generation::Generator;
use crate::memory::MemoryStore;
use crate::prompt;
use crate::retrieval::PassageRetriever;
use griot_common::config::{AnonymousScope, AppConfig};
use griot_common::db::models::{MemoryRole, MemoryTier};
use griot_common::metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// The only user-visible failure mode: returned verbatim when generation
/// fails, with no memory rows appended for the request.
pub const FALLBACK_ANSWER: &str = "Sorry, something went wrong while processing your request.";

/// Per-pipeline options, fixed at construction
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Passages retrieved per query
    pub top_k: usize,

    /// Recent turns fed into each prompt
    pub memory_limit: u64,

    /// Memory behavior for requests without a user id
    pub anonymous_scope: AnonymousScope,
}

impl PipelineOptions {
    /// Build options from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            memory_limit: config.memory.recent_limit,
            anonymous_scope: config.memory.anonymous_scope,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: 4,
            memory_limit: 5,
            anonymous_scope: AnonymousScope::Shared,
        }
    }
}

/// The answering pipeline. Constructed once at startup with its
/// collaborators injected; holds no per-request state, so concurrent
/// requests run fully independently.
pub struct AnswerPipeline {
    retriever: Arc<dyn PassageRetriever>,
    memory: Arc<dyn MemoryStore>,
    generator: Arc<dyn Generator>,
    options: PipelineOptions,
}

impl AnswerPipeline {
    /// Create a new pipeline
    pub fn new(
        retriever: Arc<dyn PassageRetriever>,
        memory: Arc<dyn MemoryStore>,
        generator: Arc<dyn Generator>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            retriever,
            memory,
            generator,
            options,
        }
    }

    /// Answer one question. Always returns a string: expected failure
    /// modes degrade or fall back, they never surface as errors.
    pub async fn answer(&self, question: &str, user_id: Option<Uuid>) -> String {
        let start = Instant::now();

        // Anonymous requests are stateless when the shared pool is disabled
        let remember = user_id.is_some()
            || self.options.anonymous_scope == AnonymousScope::Shared;

        // 1. Fetch recent memory; degrade to empty on failure
        let memories = if remember {
            match self
                .memory
                .fetch_recent(user_id, self.options.memory_limit)
                .await
            {
                Ok(memories) => memories,
                Err(e) => {
                    warn!(error = %e, "Memory fetch failed, continuing without history");
                    metrics::record_memory_fetch_failure();
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        // 2. Retrieve passages; degrade to empty context on failure
        let retrieval_start = Instant::now();
        let passages = match self.retriever.retrieve(question, self.options.top_k).await {
            Ok(passages) => {
                metrics::record_retrieval(
                    retrieval_start.elapsed().as_secs_f64(),
                    passages.len(),
                );
                passages
            }
            Err(e) => {
                warn!(error = %e, "Retrieval failed, continuing without context");
                metrics::record_retrieval_failure();
                Vec::new()
            }
        };

        // 3. Compose the prompt
        let prompt_text = prompt::compose(question, &passages, &memories);

        // 4. Generate; the only step whose failure is user-visible
        let generation_start = Instant::now();
        let answer = match self.generator.generate(&prompt_text).await {
            Ok(text) => {
                metrics::record_generation(
                    generation_start.elapsed().as_secs_f64(),
                    self.generator.model_name(),
                    true,
                );
                text
            }
            Err(e) => {
                tracing::error!(error = %e, "Generation failed, returning fallback answer");
                metrics::record_generation(
                    generation_start.elapsed().as_secs_f64(),
                    self.generator.model_name(),
                    false,
                );
                metrics::record_answer(start.elapsed().as_secs_f64(), "fallback");
                return FALLBACK_ANSWER.to_string();
            }
        };

        // 5. Persist the exchange: question first, then answer. A lost
        //    append never takes the answer down with it.
        if remember {
            self.persist_turn(question, user_id, MemoryRole::User).await;
            self.persist_turn(&answer, user_id, MemoryRole::Assistant).await;
        }

        info!(
            user_id = ?user_id,
            passages = passages.len(),
            memories = memories.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Answer produced"
        );
        metrics::record_answer(start.elapsed().as_secs_f64(), "answered");

        answer
    }

    async fn persist_turn(&self, content: &str, user_id: Option<Uuid>, role: MemoryRole) {
        if let Err(e) = self
            .memory
            .append(content, user_id, role, MemoryTier::Short)
            .await
        {
            let role_label = match role {
                MemoryRole::User => "user",
                MemoryRole::Assistant => "assistant",
                MemoryRole::System => "system",
            };
            warn!(error = %e, role = role_label, "Memory append failed, entry lost");
            metrics::record_memory_write_failure(role_label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::Passage;
    use async_trait::async_trait;
    use griot_common::errors::{AppError, Result};
    use std::sync::Mutex;

    // ------------------------------------------------------------------
    // Mock collaborators
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingMemory {
        entries: Mutex<Vec<(String, Option<Uuid>, MemoryRole)>>,
        fail_fetch: bool,
        fail_append: bool,
    }

    #[async_trait]
    impl MemoryStore for RecordingMemory {
        async fn fetch_recent(&self, user_id: Option<Uuid>, limit: u64) -> Result<Vec<String>> {
            if self.fail_fetch {
                return Err(AppError::MemoryUnavailable {
                    message: "store down".to_string(),
                });
            }

            let entries = self.entries.lock().unwrap();
            Ok(entries
                .iter()
                .rev()
                .filter(|(_, uid, _)| user_id.is_none() || *uid == user_id)
                .take(limit as usize)
                .map(|(content, _, _)| content.clone())
                .collect())
        }

        async fn append(
            &self,
            content: &str,
            user_id: Option<Uuid>,
            role: MemoryRole,
            _tier: MemoryTier,
        ) -> Result<()> {
            if self.fail_append {
                return Err(AppError::MemoryWriteFailed {
                    message: "store down".to_string(),
                });
            }

            self.entries
                .lock()
                .unwrap()
                .push((content.to_string(), user_id, role));
            Ok(())
        }
    }

    struct StaticRetriever {
        passages: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl PassageRetriever for StaticRetriever {
        async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<Passage>> {
            if self.fail {
                return Err(AppError::RetrievalUnavailable {
                    message: "index down".to_string(),
                });
            }

            Ok(self
                .passages
                .iter()
                .take(k)
                .map(|content| Passage {
                    passage_id: Uuid::new_v4(),
                    source: "guide.pdf".to_string(),
                    page: 1,
                    content: content.to_string(),
                    score: 0.9,
                })
                .collect())
        }
    }

    struct CapturingGenerator {
        prompts: Mutex<Vec<String>>,
        reply: &'static str,
        fail: bool,
    }

    impl CapturingGenerator {
        fn answering(reply: &'static str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply: "",
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Generator for CapturingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(AppError::GenerationFailed {
                    message: "quota exceeded".to_string(),
                });
            }
            Ok(self.reply.to_string())
        }

        fn model_name(&self) -> &str {
            "capturing"
        }
    }

    fn pipeline(
        retriever: StaticRetriever,
        memory: Arc<RecordingMemory>,
        generator: Arc<CapturingGenerator>,
        options: PipelineOptions,
    ) -> AnswerPipeline {
        AnswerPipeline::new(Arc::new(retriever), memory, generator, options)
    }

    fn working_retriever() -> StaticRetriever {
        StaticRetriever {
            passages: vec!["A", "B"],
            fail: false,
        }
    }

    // ------------------------------------------------------------------
    // Orchestration properties
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_success_appends_question_then_answer() {
        let memory = Arc::new(RecordingMemory::default());
        let generator = Arc::new(CapturingGenerator::answering("An answer."));
        let p = pipeline(
            working_retriever(),
            memory.clone(),
            generator,
            PipelineOptions::default(),
        );

        let user = Some(Uuid::new_v4());
        let answer = p.answer("What is autism?", user).await;
        assert_eq!(answer, "An answer.");

        let entries = memory.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "What is autism?");
        assert_eq!(entries[0].2, MemoryRole::User);
        assert_eq!(entries[1].0, "An answer.");
        assert_eq!(entries[1].2, MemoryRole::Assistant);
        assert!(entries.iter().all(|(_, uid, _)| *uid == user));
    }

    #[tokio::test]
    async fn test_generation_failure_returns_fallback_and_skips_persistence() {
        let memory = Arc::new(RecordingMemory::default());
        let generator = Arc::new(CapturingGenerator::failing());
        let p = pipeline(
            working_retriever(),
            memory.clone(),
            generator,
            PipelineOptions::default(),
        );

        let answer = p.answer("What is autism?", Some(Uuid::new_v4())).await;
        assert_eq!(answer, FALLBACK_ANSWER);
        assert_eq!(memory.entries.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_retrieval_failure_degrades_but_still_answers_and_persists() {
        let memory = Arc::new(RecordingMemory::default());
        let generator = Arc::new(CapturingGenerator::answering("From memory alone."));
        let retriever = StaticRetriever {
            passages: vec![],
            fail: true,
        };
        let p = pipeline(retriever, memory.clone(), generator.clone(), PipelineOptions::default());

        let answer = p.answer("What is autism?", Some(Uuid::new_v4())).await;
        assert!(!answer.is_empty());
        assert_eq!(answer, "From memory alone.");

        // Appends still happen after a successful generation
        assert_eq!(memory.entries.lock().unwrap().len(), 2);

        // The generator saw the explicit no-context marker
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("No relevant context found."));
    }

    #[tokio::test]
    async fn test_memory_fetch_failure_degrades_to_no_history() {
        let memory = Arc::new(RecordingMemory {
            fail_fetch: true,
            ..Default::default()
        });
        let generator = Arc::new(CapturingGenerator::answering("An answer."));
        let p = pipeline(
            working_retriever(),
            memory,
            generator.clone(),
            PipelineOptions::default(),
        );

        let answer = p.answer("What is autism?", Some(Uuid::new_v4())).await;
        assert_eq!(answer, "An answer.");

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("No prior memory."));
    }

    #[tokio::test]
    async fn test_memory_write_failure_preserves_answer() {
        let memory = Arc::new(RecordingMemory {
            fail_append: true,
            ..Default::default()
        });
        let generator = Arc::new(CapturingGenerator::answering("An answer."));
        let p = pipeline(
            working_retriever(),
            memory.clone(),
            generator,
            PipelineOptions::default(),
        );

        let answer = p.answer("What is autism?", Some(Uuid::new_v4())).await;
        assert_eq!(answer, "An answer.");
        assert_eq!(memory.entries.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_second_call_sees_first_exchange_chronologically() {
        let memory = Arc::new(RecordingMemory::default());
        let generator = Arc::new(CapturingGenerator::answering("A developmental condition."));
        let p = pipeline(
            working_retriever(),
            memory,
            generator.clone(),
            PipelineOptions::default(),
        );

        let user = Some(Uuid::new_v4());
        p.answer("What is autism?", user).await;
        p.answer("Tell me more.", user).await;

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);

        // First call saw no history; second call sees the first exchange,
        // question before answer (oldest first).
        assert!(prompts[0].contains("No prior memory."));
        assert!(prompts[1].contains("What is autism?\nA developmental condition."));
    }

    #[tokio::test]
    async fn test_anonymous_shared_scope_reads_and_writes_global_pool() {
        let memory = Arc::new(RecordingMemory::default());
        let generator = Arc::new(CapturingGenerator::answering("An answer."));
        let p = pipeline(
            working_retriever(),
            memory.clone(),
            generator,
            PipelineOptions::default(),
        );

        p.answer("What is autism?", None).await;

        let entries = memory.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|(_, uid, _)| uid.is_none()));
    }

    #[tokio::test]
    async fn test_anonymous_disabled_scope_is_stateless() {
        let memory = Arc::new(RecordingMemory::default());
        let generator = Arc::new(CapturingGenerator::answering("An answer."));
        let options = PipelineOptions {
            anonymous_scope: AnonymousScope::Disabled,
            ..Default::default()
        };
        let p = pipeline(working_retriever(), memory.clone(), generator.clone(), options);

        let answer = p.answer("What is autism?", None).await;
        assert_eq!(answer, "An answer.");
        assert_eq!(memory.entries.lock().unwrap().len(), 0);

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("No prior memory."));
    }

    #[tokio::test]
    async fn test_memory_limit_is_respected() {
        let memory = Arc::new(RecordingMemory::default());
        let generator = Arc::new(CapturingGenerator::answering("Short."));
        let options = PipelineOptions {
            memory_limit: 2,
            ..Default::default()
        };
        let p = pipeline(working_retriever(), memory, generator.clone(), options);

        let user = Some(Uuid::new_v4());
        p.answer("Q1", user).await;
        p.answer("Q2", user).await;
        p.answer("Q3", user).await;

        // Third prompt carries only the two most recent turns: Q2's answer
        // and Q2 itself, oldest first.
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[2].contains("Q2\nShort."));
        assert!(!prompts[2].contains("Q1"));
    }
}
