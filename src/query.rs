//! Query pipeline: retrieve → assemble prompt → generate.
//!
//! Runs once per chat turn. Exactly one retrieval call and exactly one
//! generation call per invocation; there is no iterative re-retrieval.
//! Empty retrieval does not short-circuit: the request is sent with an
//! empty context block and the model answers ungrounded.

use tracing::debug;

use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::error::RagError;
use crate::generation::GenerationClient;
use crate::index::VectorIndex;
use crate::models::ConversationTurn;
use crate::prompt;
use crate::retrieve::RetrievalEngine;

/// Composes the retrieval engine, prompt builder, and generation client.
pub struct QueryPipeline<'a> {
    embeddings: &'a dyn EmbeddingClient,
    index: &'a dyn VectorIndex,
    generation: &'a dyn GenerationClient,
    config: &'a Config,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(
        embeddings: &'a dyn EmbeddingClient,
        index: &'a dyn VectorIndex,
        generation: &'a dyn GenerationClient,
        config: &'a Config,
    ) -> Self {
        Self {
            embeddings,
            index,
            generation,
            config,
        }
    }

    /// Answer a user query, grounded in retrieved context.
    ///
    /// `history` holds the conversation's prior turns, supplied by the
    /// external conversation store; it may be empty for a first turn.
    pub async fn answer(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<String, RagError> {
        let engine = RetrievalEngine::new(self.embeddings, self.index);
        let matches = engine.retrieve(query, self.config.retrieval.top_k).await?;

        let request = prompt::build(
            &self.config.generation.system_instruction,
            history,
            &matches,
            query,
            self.config.generation.temperature,
        );

        debug!(
            matches = matches.len(),
            history_turns = history.len(),
            "generating answer"
        );

        self.generation
            .generate(&request)
            .await
            .map_err(RagError::Generation)
    }
}
