//! Retrieval engine: query embedding, similarity search, context assembly.
//!
//! Embeds the user query and asks the vector index for the `top_k` most
//! similar chunks under cosine similarity, metadata included. Zero matches
//! (empty index, or nothing similar) is a valid outcome, not an error:
//! callers treat it as "no grounding available".

use tracing::debug;

use crate::embedding::EmbeddingClient;
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::models::RetrievedMatch;

/// Delimiter between chunk texts in the assembled context block.
pub const CONTEXT_DELIMITER: &str = "\n\n";

/// Composes the embedding client and vector index for query-time lookup.
pub struct RetrievalEngine<'a> {
    embeddings: &'a dyn EmbeddingClient,
    index: &'a dyn VectorIndex,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(embeddings: &'a dyn EmbeddingClient, index: &'a dyn VectorIndex) -> Self {
        Self { embeddings, index }
    }

    /// Return up to `top_k` matches, highest similarity first.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedMatch>, RagError> {
        let query_vector = self
            .embeddings
            .embed(query)
            .await
            .map_err(RagError::Embedding)?;

        let mut matches = self
            .index
            .query(&query_vector, top_k)
            .await
            .map_err(RagError::Index)?;

        // The index contract already orders by similarity; enforce it here
        // so a misbehaving backend cannot scramble the prompt.
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(matches = matches.len(), top_k, "retrieved context");
        Ok(matches)
    }
}

/// Concatenate matched chunk texts, in ranked order, into one context block.
pub fn assemble_context(matches: &[RetrievedMatch]) -> String {
    matches
        .iter()
        .map(|m| m.metadata.source_text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}
