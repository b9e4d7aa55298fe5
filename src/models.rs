//! Core data models shared by the ingestion and query pipelines.
//!
//! These types represent documents, chunks, retrieved matches, and
//! conversation turns as they flow between the pipeline stages.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Declared content kind of a source document.
///
/// Only a binary PDF / plain-text distinction is made; anything else is
/// rejected with `UnsupportedFormat` before loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

/// Opaque reference to an uploaded document, resolved by the loader.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub path: PathBuf,
}

impl DocumentHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A loaded document: identity, declared kind, and raw text.
/// Immutable once loaded.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub source_id: String,
    pub kind: DocumentKind,
    pub text: String,
}

/// An ordered segment of a document's text, produced by the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub source_id: String,
}

/// Metadata stored alongside each vector in the index, and returned with
/// every match. Carries the chunk text for prompt assembly and the source
/// identifier for provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    #[serde(rename = "text")]
    pub source_text: String,
    #[serde(rename = "source")]
    pub source_id: String,
}

/// A single similarity-search hit: stored metadata plus a cosine score.
#[derive(Debug, Clone)]
pub struct RetrievedMatch {
    pub score: f32,
    pub metadata: ChunkMetadata,
}

/// Speaker role within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation, supplied by the external conversation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A fully assembled request for the generation backend: system instruction,
/// prior turns, the grounded user message, and fixed generation parameters.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub messages: Vec<ConversationTurn>,
    pub temperature: f32,
}
