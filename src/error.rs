//! Typed failure taxonomy for the RAG pipelines.
//!
//! Collaborator seams ([`EmbeddingClient`](crate::embedding::EmbeddingClient),
//! [`VectorIndex`](crate::index::VectorIndex),
//! [`GenerationClient`](crate::generation::GenerationClient)) return
//! `anyhow::Result`; each pipeline translates those failures into one of the
//! variants here at its boundary, so callers always see a typed error.
//!
//! Propagation policy:
//! - Loading and format errors abort ingestion before any upsert.
//! - A mid-document embed or upsert failure aborts the remaining chunks and
//!   is reported as [`RagError::PartialIngestion`] with the counts of chunks
//!   already indexed; already-written entries are kept (no rollback).
//! - Query-time embedding or generation failures are fatal to that single
//!   request. The core never retries; retry/backoff belongs to the caller.
//! - Title generation never surfaces an error (see [`crate::title`]).

use thiserror::Error;

/// Errors surfaced by the ingestion and query pipelines.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document's declared kind is neither PDF nor plain text.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Content extraction failed (unreadable file, corrupt PDF).
    #[error("failed to load document: {0}")]
    Load(anyhow::Error),

    /// The embedding backend rejected or failed a request.
    #[error("embedding request failed: {0}")]
    Embedding(anyhow::Error),

    /// The vector index rejected or failed an upsert or query.
    #[error("vector index operation failed: {0}")]
    Index(anyhow::Error),

    /// The generation backend rejected or failed a request.
    #[error("generation request failed: {0}")]
    Generation(anyhow::Error),

    /// Ingestion stopped partway through a document. Chunks indexed before
    /// the failure remain in the index.
    #[error(
        "document '{source_id}' partially ingested: {chunks_indexed} chunks indexed, \
         {chunks_failed} failed: {cause}"
    )]
    PartialIngestion {
        source_id: String,
        chunks_indexed: usize,
        chunks_failed: usize,
        cause: anyhow::Error,
    },
}
