//! Process-wide RAG service holding the long-lived collaborator handles.
//!
//! One [`RagService`] is constructed at process start and shared across
//! requests; each pipeline invocation borrows the same embedding, index,
//! and generation handles (invocations never mutate shared client state,
//! so concurrent use is safe). The constructor asserts that the embedding
//! client's output dimensionality matches the index's configured
//! dimensionality; a mismatch is a fatal configuration error.

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::config::Config;
use crate::embedding::{self, EmbeddingClient};
use crate::error::RagError;
use crate::generation::{self, GenerationClient};
use crate::index::{self, VectorIndex};
use crate::ingest::IngestionPipeline;
use crate::models::{ConversationTurn, DocumentHandle};
use crate::query::QueryPipeline;
use crate::title::TitleGenerator;

pub struct RagService {
    config: Config,
    embeddings: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    generation: Arc<dyn GenerationClient>,
}

impl RagService {
    /// Assemble a service from explicit collaborator handles.
    pub fn new(
        config: Config,
        embeddings: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        generation: Arc<dyn GenerationClient>,
    ) -> Result<Self> {
        crate::config::validate(&config)?;
        if embeddings.dims() != index.dims() {
            bail!(
                "Embedding dimensionality ({}) does not match index dimensionality ({})",
                embeddings.dims(),
                index.dims()
            );
        }
        Ok(Self {
            config,
            embeddings,
            index,
            generation,
        })
    }

    /// Build all collaborators from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let embeddings = embedding::create_client(&config.embedding)?;
        let index = index::create_index(&config.index)?;
        let generation = generation::create_client(&config.generation)?;
        Self::new(config, embeddings, index, generation)
    }

    /// Ingest one uploaded document; returns the number of chunks indexed.
    pub async fn ingest(&self, handle: &DocumentHandle) -> Result<usize, RagError> {
        IngestionPipeline::new(
            self.embeddings.as_ref(),
            self.index.as_ref(),
            &self.config.chunking,
        )
        .ingest(handle)
        .await
    }

    /// Answer one chat turn, grounded in retrieved context.
    pub async fn answer(
        &self,
        query: &str,
        history: &[ConversationTurn],
    ) -> Result<String, RagError> {
        QueryPipeline::new(
            self.embeddings.as_ref(),
            self.index.as_ref(),
            self.generation.as_ref(),
            &self.config,
        )
        .answer(query, history)
        .await
    }

    /// Derive a title for a new conversation's first exchange. Never fails.
    pub async fn title_for(&self, first_user_message: &str, first_answer: &str) -> String {
        TitleGenerator::new(
            self.generation.as_ref(),
            &self.config.generation.title_instruction,
            self.config.generation.temperature,
        )
        .title_for(first_user_message, first_answer)
        .await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl std::fmt::Debug for RagService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagService").finish_non_exhaustive()
    }
}
