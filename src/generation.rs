//! Generation client abstraction and implementations.
//!
//! Defines the [`GenerationClient`] trait and two backends:
//! - **[`DisabledGeneration`]** — always errors; used when generation is not
//!   configured.
//! - **[`OpenAiChatClient`]** — calls an OpenAI-compatible
//!   `POST {base_url}/chat/completions` endpoint.
//!
//! Requests carry a system instruction, the conversation turns, and a fixed
//! temperature; no state is retained between calls. As with embeddings, the
//! core never retries a failed call.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::models::GenerationRequest;

/// Produces natural-language text from an assembled request. Long-lived and
/// shared across pipeline invocations.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// A no-op generation backend that always returns errors.
pub struct DisabledGeneration;

#[async_trait]
impl GenerationClient for DisabledGeneration {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        bail!("Generation provider is disabled")
    }
}

/// Chat-completion client for OpenAI-compatible APIs.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl GenerationClient for OpenAiChatClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(serde_json::json!({
            "role": "system",
            "content": request.system_instruction,
        }));
        for turn in &request.messages {
            messages.push(serde_json::json!({
                "role": turn.role.as_str(),
                "content": turn.text,
            }));
        }

        let body = serde_json::json!({
            "model": self.model,
            "temperature": request.temperature,
            "messages": messages,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Generation API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_chat_response(&json)
    }
}

/// Parse an OpenAI-style chat response: `choices[0].message.content`.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("Invalid chat response: missing choices[0].message.content"))
}

/// Create the configured [`GenerationClient`].
///
/// The `openai` backend reads its API key from `OPENAI_API_KEY`.
pub fn create_client(config: &GenerationConfig) -> Result<Arc<dyn GenerationClient>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGeneration)),
        "openai" => {
            let model = config
                .model
                .clone()
                .ok_or_else(|| anyhow!("generation.model required for openai provider"))?;
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
            Ok(Arc::new(OpenAiChatClient::new(
                config.base_url.clone(),
                api_key,
                model,
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        other => bail!("Unknown generation provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConversationTurn;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "Answer plainly.".to_string(),
            messages: vec![ConversationTurn::user("What is the capital of France?")],
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn generate_returns_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "system", "content": "Answer plainly."},
                    {"role": "user", "content": "What is the capital of France?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Paris."}}]
            })))
            .mount(&server)
            .await;

        let client =
            OpenAiChatClient::new(server.uri(), "key", "gpt-4o-mini", Duration::from_secs(5))
                .unwrap();
        let answer = client.generate(&request()).await.unwrap();
        assert_eq!(answer, "Paris.");
    }

    #[tokio::test]
    async fn api_error_surfaces_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client =
            OpenAiChatClient::new(server.uri(), "key", "gpt-4o-mini", Duration::from_secs(5))
                .unwrap();
        let err = client.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn missing_choices_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client =
            OpenAiChatClient::new(server.uri(), "key", "gpt-4o-mini", Duration::from_secs(5))
                .unwrap();
        assert!(client.generate(&request()).await.is_err());
    }
}
