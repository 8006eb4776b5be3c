//! Prompt composition
//!
//! Pure, deterministic template merge of retrieved context, recent memory,
//! and the question. No I/O, no side effects.

use crate::retrieval::Passage;

/// Rendered when retrieval returns nothing. An explicit marker, never an
/// empty string, so the model does not silently fabricate context.
pub const NO_CONTEXT_MARKER: &str = "No relevant context found.";

/// Rendered when the user has no prior turns
pub const NO_MEMORY_MARKER: &str = "No prior memory.";

/// The exact refusal the model is instructed to produce when the answer is
/// not derivable from the supplied context
pub const REFUSAL_ANSWER: &str = "I do not know.";

/// Compose the generation prompt.
///
/// `passages` are joined in rank order; `memory` arrives most-recent-first
/// from the store and is reversed here so the prompt reads oldest-first.
pub fn compose(question: &str, passages: &[Passage], memory: &[String]) -> String {
    format!(
        "You are a helpful assistant for a curated knowledge base.\n\
        \n\
        User Memory:\n\
        {memory}\n\
        \n\
        Knowledge Context:\n\
        {context}\n\
        \n\
        If the answer is NOT present in the knowledge context, respond with:\n\
        \"{refusal}\"\n\
        \n\
        Question:\n\
        {question}\n\
        \n\
        Answer:\n",
        memory = format_memory(memory),
        context = format_context(passages),
        refusal = REFUSAL_ANSWER,
        question = question,
    )
}

/// Render retrieved passages into the context block, rank order preserved
pub fn format_context(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return NO_CONTEXT_MARKER.to_string();
    }

    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render memory into the memory block, oldest first
pub fn format_memory(memory: &[String]) -> String {
    if memory.is_empty() {
        return NO_MEMORY_MARKER.to_string();
    }

    memory
        .iter()
        .rev()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
