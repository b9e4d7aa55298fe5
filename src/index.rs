//! Vector index abstraction and implementations.
//!
//! The [`VectorIndex`] trait stores embedding vectors with chunk metadata
//! and answers top-k cosine-similarity queries. Two backends:
//! - **[`InMemoryIndex`]** — brute-force cosine over a `RwLock`-guarded
//!   vector; used by tests and embedded callers.
//! - **[`HttpVectorIndex`]** — a hosted index spoken to over HTTP
//!   (`POST /vectors/upsert`, `POST /query`), Pinecone-style wire format.
//!
//! Dimensionality and the similarity metric are index-level configuration;
//! the service constructor asserts the dims match the embedding client's
//! output at startup. Upserts from independent ingestion calls may
//! interleave; implementations must not corrupt unrelated entries.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::config::IndexConfig;
use crate::models::{ChunkMetadata, RetrievedMatch};

/// Stores `(vector, metadata)` pairs and answers similarity queries.
/// Long-lived and shared; implementations must tolerate concurrent use.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Configured dimensionality of stored vectors.
    fn dims(&self) -> usize;

    /// Insert or replace the entry with the given id.
    async fn upsert(&self, id: &str, vector: &[f32], metadata: ChunkMetadata) -> Result<()>;

    /// Return up to `top_k` entries ordered by descending cosine similarity
    /// to `vector`, metadata included. An empty index yields an empty
    /// sequence, not an error.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedMatch>>;
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`, or `0.0` for empty vectors or vectors
/// of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

struct IndexedEntry {
    id: String,
    vector: Vec<f32>,
    metadata: ChunkMetadata,
}

/// Brute-force in-memory index for tests and embedded use.
pub struct InMemoryIndex {
    dims: usize,
    entries: RwLock<Vec<IndexedEntry>>,
}

impl InMemoryIndex {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn upsert(&self, id: &str, vector: &[f32], metadata: ChunkMetadata) -> Result<()> {
        if vector.len() != self.dims {
            bail!(
                "Vector dimensionality mismatch: index is {}, got {}",
                self.dims,
                vector.len()
            );
        }
        let mut entries = self.entries.write().unwrap();
        entries.retain(|e| e.id != id);
        entries.push(IndexedEntry {
            id: id.to_string(),
            vector: vector.to_vec(),
            metadata,
        });
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedMatch>> {
        let entries = self.entries.read().unwrap();
        let mut matches: Vec<RetrievedMatch> = entries
            .iter()
            .map(|e| RetrievedMatch {
                score: cosine_similarity(vector, &e.vector),
                metadata: e.metadata.clone(),
            })
            .collect();
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }
}

/// Client for a hosted vector index with a Pinecone-style HTTP API.
///
/// Upserts go to `POST {base_url}/vectors/upsert`; queries to
/// `POST {base_url}/query` with `includeMetadata` set. The API key is sent
/// in the `Api-Key` header.
pub struct HttpVectorIndex {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    dims: usize,
}

impl HttpVectorIndex {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        dims: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            dims,
        })
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn upsert(&self, id: &str, vector: &[f32], metadata: ChunkMetadata) -> Result<()> {
        let body = serde_json::json!({
            "vectors": [{
                "id": id,
                "values": vector,
                "metadata": metadata,
            }]
        });

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Vector index upsert error {}: {}", status, body_text);
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedMatch>> {
        let body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });

        let response = self
            .client
            .post(format!("{}/query", self.base_url))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Vector index query error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_query_response(&json)
    }
}

/// Parse a Pinecone-style query response: `matches[]` with `score` and
/// `metadata.{text,source}`.
fn parse_query_response(json: &serde_json::Value) -> Result<Vec<RetrievedMatch>> {
    let raw_matches = json
        .get("matches")
        .and_then(|m| m.as_array())
        .ok_or_else(|| anyhow!("Invalid query response: missing matches array"))?;

    let mut matches = Vec::with_capacity(raw_matches.len());
    for item in raw_matches {
        let score = item.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0) as f32;
        let metadata: ChunkMetadata = item
            .get("metadata")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| anyhow!("Invalid query response: match missing metadata"))?;
        matches.push(RetrievedMatch { score, metadata });
    }
    Ok(matches)
}

/// Create the configured [`VectorIndex`].
///
/// The `http` backend reads its API key from `VECTOR_INDEX_API_KEY`.
pub fn create_index(config: &IndexConfig) -> Result<Arc<dyn VectorIndex>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryIndex::new(config.dims))),
        "http" => {
            let base_url = config
                .base_url
                .clone()
                .ok_or_else(|| anyhow!("index.base_url required for http backend"))?;
            let api_key = std::env::var("VECTOR_INDEX_API_KEY")
                .map_err(|_| anyhow!("VECTOR_INDEX_API_KEY environment variable not set"))?;
            Ok(Arc::new(HttpVectorIndex::new(
                base_url,
                api_key,
                config.dims,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        other => bail!("Unknown index backend: {}", other),
    }
}
