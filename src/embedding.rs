//! Embedding client abstraction and implementations.
//!
//! Defines the [`EmbeddingClient`] trait and two backends:
//! - **[`DisabledEmbedding`]** — always errors; used when embeddings are not
//!   configured.
//! - **[`OpenAiEmbeddingClient`]** — calls an OpenAI-compatible
//!   `POST {base_url}/embeddings` endpoint.
//!
//! The output dimensionality is declared at configuration time and is
//! asserted against the vector index when the service is constructed; a
//! mismatch is a fatal configuration error, never a per-call one.
//!
//! The core performs no retries: a failed call surfaces as an error that
//! the pipelines translate into [`RagError::Embedding`](crate::error::RagError);
//! retry/backoff is layered on by the caller if desired.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Maps text to a fixed-dimension vector. Long-lived and shared across
/// pipeline invocations; implementations must tolerate concurrent use.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Declared output dimensionality.
    fn dims(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, one vector per input, in input order.
    /// The default implementation embeds sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// A no-op embedding backend that always returns errors.
pub struct DisabledEmbedding;

#[async_trait]
impl EmbeddingClient for DisabledEmbedding {
    fn dims(&self) -> usize {
        0
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        bail!("Embedding provider is disabled")
    }
}

/// Embedding client for OpenAI-compatible APIs.
///
/// Sends `POST {base_url}/embeddings` with the configured model and the
/// requested output dimensionality.
pub struct OpenAiEmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dims: usize,
}

impl OpenAiEmbeddingClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        dims: usize,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dims,
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": texts,
            "dimensions": self.dims,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Embedding API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_embedding_response(&json)
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vectors = self.request(&[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.request(texts).await?;
        if vectors.len() != texts.len() {
            bail!(
                "Embedding response count mismatch: sent {}, received {}",
                texts.len(),
                vectors.len()
            );
        }
        Ok(vectors)
    }
}

/// Parse an OpenAI-style embeddings response: `data[].embedding` arrays,
/// returned in input order.
fn parse_embedding_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow!("Invalid embedding response: missing data array"))?;

    let mut embeddings = Vec::with_capacity(data.len());
    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| anyhow!("Invalid embedding response: missing embedding"))?;
        let vec: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        embeddings.push(vec);
    }
    Ok(embeddings)
}

/// Create the configured [`EmbeddingClient`].
///
/// The `openai` backend reads its API key from `OPENAI_API_KEY`.
pub fn create_client(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingClient>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledEmbedding)),
        "openai" => {
            let model = config
                .model
                .clone()
                .ok_or_else(|| anyhow!("embedding.model required for openai provider"))?;
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
            Ok(Arc::new(OpenAiEmbeddingClient::new(
                config.base_url.clone(),
                api_key,
                model,
                config.dims,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        other => bail!("Unknown embedding provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> OpenAiEmbeddingClient {
        OpenAiEmbeddingClient::new(
            base_url,
            "test-key",
            "text-embedding-3-small",
            3,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn embed_returns_vector_from_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]
            })))
            .mount(&server)
            .await;

        let vector = client(&server.uri()).embed("hello").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn embed_batch_preserves_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-3-small",
                "dimensions": 3,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"embedding": [1.0, 0.0, 0.0], "index": 0},
                    {"embedding": [0.0, 1.0, 0.0], "index": 1}
                ]
            })))
            .mount(&server)
            .await;

        let texts = vec!["first".to_string(), "second".to_string()];
        let vectors = client(&server.uri()).embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0, 0.0]);
    }

    #[tokio::test]
    async fn server_error_surfaces_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).embed("hello").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn malformed_response_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"unexpected": true})),
            )
            .mount(&server)
            .await;

        let err = client(&server.uri()).embed("hello").await.unwrap_err();
        assert!(err.to_string().contains("missing data array"));
    }

    #[tokio::test]
    async fn disabled_backend_always_errors() {
        assert!(DisabledEmbedding.embed("anything").await.is_err());
    }
}
