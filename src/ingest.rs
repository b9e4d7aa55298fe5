//! Ingestion pipeline: load → chunk → embed → upsert.
//!
//! Runs once per uploaded document. Chunks are embedded and upserted in
//! source order, one vector per chunk; a failure partway through aborts
//! the remaining chunks but keeps what was already written, reported as
//! [`RagError::PartialIngestion`] with the counts. Re-ingesting the same
//! document overwrites its entries id-by-id (ids are deterministic), but
//! no deduplication across differently-named sources is attempted.

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::chunk::split_text;
use crate::config::ChunkingConfig;
use crate::embedding::EmbeddingClient;
use crate::error::RagError;
use crate::index::VectorIndex;
use crate::loader;
use crate::models::{Chunk, ChunkMetadata, DocumentHandle};

/// Composes the document loader, chunker, embedding client, and vector
/// index. Holds borrowed long-lived handles; construct per invocation.
pub struct IngestionPipeline<'a> {
    embeddings: &'a dyn EmbeddingClient,
    index: &'a dyn VectorIndex,
    chunking: &'a ChunkingConfig,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        embeddings: &'a dyn EmbeddingClient,
        index: &'a dyn VectorIndex,
        chunking: &'a ChunkingConfig,
    ) -> Self {
        Self {
            embeddings,
            index,
            chunking,
        }
    }

    /// Ingest one document and return the number of chunks indexed.
    pub async fn ingest(&self, handle: &DocumentHandle) -> Result<usize, RagError> {
        let doc = loader::load(handle)?;
        let chunks = split_text(
            &doc.source_id,
            &doc.text,
            self.chunking.chunk_size,
            self.chunking.overlap,
        );
        let total = chunks.len();
        debug!(source_id = %doc.source_id, chunks = total, "chunked document");

        for (indexed, chunk) in chunks.iter().enumerate() {
            if let Err(cause) = self.index_chunk(chunk).await {
                return Err(RagError::PartialIngestion {
                    source_id: doc.source_id,
                    chunks_indexed: indexed,
                    chunks_failed: total - indexed,
                    cause,
                });
            }
        }

        info!(source_id = %doc.source_id, chunks = total, "ingested document");
        Ok(total)
    }

    async fn index_chunk(&self, chunk: &Chunk) -> anyhow::Result<()> {
        let vector = self.embeddings.embed(&chunk.text).await?;
        let id = vector_id(&chunk.source_id, chunk.index);
        let metadata = ChunkMetadata {
            source_text: chunk.text.clone(),
            source_id: chunk.source_id.clone(),
        };
        self.index.upsert(&id, &vector, metadata).await
    }
}

/// Deterministic vector id: hash of the source identifier plus the chunk
/// index, so re-ingesting a document overwrites its own entries.
pub fn vector_id(source_id: &str, index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    format!("{}-{}", &hash[..16], index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_ids_are_deterministic_and_indexed() {
        let a = vector_id("report.txt", 0);
        let b = vector_id("report.txt", 0);
        let c = vector_id("report.txt", 1);
        let d = vector_id("other.txt", 0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(a.ends_with("-0"));
        assert!(c.ends_with("-1"));
    }
}
