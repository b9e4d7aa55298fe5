//! Conversation title derivation with a deterministic local fallback.
//!
//! One generation call with a dedicated system instruction asking for a
//! short title. This is the only component with a mandatory local recovery
//! path: if the call fails or returns an empty result, the title falls back
//! to the first characters of the user's message. Failure here never
//! reaches the caller.

use tracing::warn;

use crate::generation::GenerationClient;
use crate::models::{ConversationTurn, GenerationRequest};

/// Characters of the first user message used when generation fails.
const FALLBACK_TITLE_CHARS: usize = 30;

/// Derives a short conversation title from the first exchange.
pub struct TitleGenerator<'a> {
    generation: &'a dyn GenerationClient,
    instruction: &'a str,
    temperature: f32,
}

impl<'a> TitleGenerator<'a> {
    pub fn new(generation: &'a dyn GenerationClient, instruction: &'a str, temperature: f32) -> Self {
        Self {
            generation,
            instruction,
            temperature,
        }
    }

    /// Produce a title for a conversation's first exchange. Never fails.
    pub async fn title_for(&self, first_user_message: &str, first_answer: &str) -> String {
        let request = GenerationRequest {
            system_instruction: self.instruction.to_string(),
            messages: vec![ConversationTurn::user(format!(
                "User message: {}\nAssistant reply: {}\n\nTitle:",
                first_user_message, first_answer
            ))],
            temperature: self.temperature,
        };

        match self.generation.generate(&request).await {
            Ok(title) => {
                let trimmed = title.trim();
                if trimmed.is_empty() {
                    warn!("title generation returned empty text, using fallback");
                    fallback_title(first_user_message)
                } else {
                    trimmed.to_string()
                }
            }
            Err(err) => {
                warn!(error = %err, "title generation failed, using fallback");
                fallback_title(first_user_message)
            }
        }
    }
}

/// First [`FALLBACK_TITLE_CHARS`] characters of the message, truncated but
/// never padded.
fn fallback_title(first_user_message: &str) -> String {
    first_user_message.chars().take(FALLBACK_TITLE_CHARS).collect()
}
