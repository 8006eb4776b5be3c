//! Griot Answering Pipeline
//!
//! Retrieval-augmented, memory-conditioned question answering. One request
//! flows through a fixed sequence: fetch recent memory, retrieve passages,
//! compose the prompt, call the hosted model, persist the exchange. The
//! orchestrator in [`answerer`] owns that sequence and all failure
//! containment; every other module is a single collaborator behind a trait.

pub mod answerer;
pub mod generation;
pub mod memory;
pub mod prompt;
pub mod retrieval;

// Re-export the pipeline surface
pub use answerer::{AnswerPipeline, PipelineOptions, FALLBACK_ANSWER};
pub use generation::{create_generator, Generator};
pub use memory::{MemoryStore, PgMemoryStore};
pub use retrieval::{Passage, PassageRetriever, VectorRetriever};
