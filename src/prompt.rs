//! Prompt assembly for grounded generation.
//!
//! Combines the configured system instruction, the retrieved context, and
//! the user query into a [`GenerationRequest`] with a fixed template: a
//! context section labeled distinctly from the question section. When no
//! context was retrieved the template structure is preserved with an empty
//! context block; the request is still well-formed and is sent to the
//! generation backend unconditionally.

use crate::models::{ConversationTurn, GenerationRequest, RetrievedMatch};
use crate::retrieve::assemble_context;

/// Build a generation request from retrieved matches and the user query.
///
/// Prior conversation turns, if any, are placed before the grounded user
/// message so the generation backend sees the dialogue in order.
pub fn build(
    system_instruction: &str,
    history: &[ConversationTurn],
    matches: &[RetrievedMatch],
    query: &str,
    temperature: f32,
) -> GenerationRequest {
    let context = assemble_context(matches);
    let grounded = format!("Context:\n{}\n\nQuestion: {}", context, query);

    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.extend_from_slice(history);
    messages.push(ConversationTurn::user(grounded));

    GenerationRequest {
        system_instruction: system_instruction.to_string(),
        messages,
        temperature,
    }
}
