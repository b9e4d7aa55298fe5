//! TOML configuration for the RAG core.
//!
//! All tunables live here: chunking geometry, retrieval depth, and the
//! embedding / index / generation backend settings. [`load_config`] parses
//! and validates a config file; invalid combinations (zero chunk size,
//! overlap not smaller than the chunk size, enabled backends missing a
//! model) are rejected at load time rather than surfacing mid-pipeline.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks of one document.
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Number of matches injected into the generation prompt. A tunable,
    /// not a derived value: too large risks overflowing the generation
    /// model's context window, too small starves the answer of grounding.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// Backend selector: `"openai"` or `"disabled"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Output dimensionality. Must match the index's configured dims.
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: default_dims(),
            base_url: default_openai_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Backend selector: `"memory"` or `"http"`.
    #[serde(default = "default_index_backend")]
    pub backend: String,
    /// Dimensionality of stored vectors. Asserted against the embedding
    /// client's dims when the service is constructed.
    #[serde(default = "default_dims")]
    pub dims: usize,
    /// Base URL of the hosted vector index (required for `"http"`).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend: default_index_backend(),
            dims: default_dims(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Backend selector: `"openai"` or `"disabled"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Fixed creativity setting for answer generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Style-enforcing system instruction prepended to every answer request.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
    /// System instruction used for conversation title requests.
    #[serde(default = "default_title_instruction")]
    pub title_instruction: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: default_openai_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            system_instruction: default_system_instruction(),
            title_instruction: default_title_instruction(),
        }
    }
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_index_backend() -> String {
    "memory".to_string()
}
fn default_dims() -> usize {
    1024
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.7
}

fn default_system_instruction() -> String {
    "You are a precise, professional assistant. Answer clearly and \
     completely in plain prose only. Do not use bold text, Markdown \
     headings, asterisks, or special symbols. Start a new line after any \
     dash used to list items. Write readable paragraphs in a professional \
     style."
        .to_string()
}

fn default_title_instruction() -> String {
    "You are an expert at summarizing. Generate a very short (5-6 words \
     maximum), professional title for this conversation. No quotation \
     marks, no trailing period."
        .to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Reject configurations that would violate pipeline invariants.
pub fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.overlap == 0 || config.chunking.overlap >= config.chunking.chunk_size {
        anyhow::bail!(
            "chunking.overlap must satisfy 0 < overlap < chunk_size (got overlap={}, chunk_size={})",
            config.chunking.overlap,
            config.chunking.chunk_size
        );
    }
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.embedding.is_enabled() {
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.dims == 0 {
            anyhow::bail!("embedding.dims must be > 0");
        }
    }
    if config.generation.is_enabled() && config.generation.model.is_none() {
        anyhow::bail!(
            "generation.model must be specified when provider is '{}'",
            config.generation.provider
        );
    }
    match config.index.backend.as_str() {
        "memory" => {}
        "http" => {
            if config.index.base_url.is_none() {
                anyhow::bail!("index.base_url must be specified when backend is 'http'");
            }
        }
        other => anyhow::bail!("Unknown index backend: '{}'. Must be memory or http.", other),
    }
    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    match config.generation.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    Ok(())
}
