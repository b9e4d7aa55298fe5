//! # ragpipe
//!
//! Retrieval-augmented generation core for document-grounded chat.
//!
//! ragpipe turns uploaded documents into searchable context and user
//! queries into grounded answers. It is a library: HTTP routing,
//! conversation persistence, and upload handling belong to the calling
//! layer.
//!
//! ## Architecture
//!
//! ```text
//! ingestion:  ┌────────┐   ┌─────────┐   ┌───────────┐   ┌─────────────┐
//!             │ Loader │──▶│ Chunker │──▶│ Embedding │──▶│ VectorIndex │
//!             └────────┘   └─────────┘   └───────────┘   └──────┬──────┘
//!                                                               │
//! query:      ┌───────────┐   ┌───────────┐   ┌────────┐   ┌────▼─────┐
//!             │ Embedding │──▶│ Retrieval │──▶│ Prompt │──▶│Generation│
//!             └───────────┘   └───────────┘   └────────┘   └──────────┘
//! ```
//!
//! A single [`service::RagService`] owns the long-lived embedding, index,
//! and generation handles; each pipeline invocation runs synchronously
//! within its request and borrows them.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | Typed pipeline error taxonomy |
//! | [`models`] | Core data types |
//! | [`chunk`] | Overlapping sliding-window chunker |
//! | [`loader`] | PDF / plain-text document loading |
//! | [`embedding`] | Embedding client abstraction |
//! | [`index`] | Vector index abstraction |
//! | [`generation`] | Generation client abstraction |
//! | [`ingest`] | Ingestion pipeline |
//! | [`retrieve`] | Similarity retrieval and context assembly |
//! | [`prompt`] | Grounded prompt assembly |
//! | [`query`] | Query pipeline |
//! | [`title`] | Conversation title derivation |
//! | [`service`] | Process-wide service wiring |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod models;
pub mod prompt;
pub mod query;
pub mod retrieve;
pub mod service;
pub mod title;
