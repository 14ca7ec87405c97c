//! OpenAI embedding and chat-completion clients.
//!
//! This module is only available when the `openai` feature is enabled. Both
//! clients call the REST API directly with `reqwest` and share an
//! [`OpenAIConfig`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::model::{ChatModel, Message};

/// The default OpenAI API base URL.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// The default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// The default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// The dimensionality of `text-embedding-3-small`.
const DEFAULT_DIMENSIONS: usize = 1536;

const PROVIDER: &str = "OpenAI";

/// Connection and model settings shared by the OpenAI clients.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    /// Upper bound on a single HTTP request, connect to last byte.
    pub request_timeout: Duration,
}

impl OpenAIConfig {
    /// Create a config with default models, temperature 0.3 and a 60 s timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            temperature: 0.3,
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Read `OPENAI_API_KEY` and, if set, `OPENAI_BASE_URL` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the key is unset or empty.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(RagError::ConfigError(
                "OPENAI_API_KEY environment variable not set".into(),
            ));
        }
        let mut config = Self::new(api_key.trim());
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim().trim_end_matches('/').to_string();
            }
        }
        Ok(config)
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        if self.api_key.is_empty() {
            return Err(RagError::ConfigError("API key must not be empty".into()));
        }
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Send a JSON POST and decode the response, turning every failure into a
/// message suitable for [`RagError`].
async fn post_json<Req, Resp>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &Req,
) -> std::result::Result<Resp, String>
where
    Req: Serialize + ?Sized,
    Resp: for<'de> Deserialize<'de>,
{
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                format!("request timed out: {e}")
            } else {
                format!("request failed: {e}")
            }
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail =
            serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
        return Err(format!("API returned {status}: {detail}"));
    }

    response.json::<Resp>().await.map_err(|e| format!("failed to parse response: {e}"))
}

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings API.
///
/// # Example
///
/// ```rust,ignore
/// use faqbot_rag::openai::{OpenAIConfig, OpenAIEmbeddingProvider};
///
/// let provider = OpenAIEmbeddingProvider::new(OpenAIConfig::from_env()?)?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    config: OpenAIConfig,
    dimensions: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider for `config.embedding_model`.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self { client, config, dimensions: DEFAULT_DIMENSIONS })
    }

    /// Override the reported dimensionality for models other than the default.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: PROVIDER.into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.config.embedding_model,
            "embedding batch"
        );

        let request = EmbeddingRequest { model: &self.config.embedding_model, input: texts };
        let response: EmbeddingResponse = post_json(
            &self.client,
            &self.config.url("embeddings"),
            &self.config.api_key,
            &request,
        )
        .await
        .map_err(|message| {
            debug!(provider = PROVIDER, error = %message, "embedding request failed");
            RagError::EmbeddingError { provider: PROVIDER.into(), message }
        })?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A [`ChatModel`] backed by the OpenAI chat-completions API.
///
/// # Example
///
/// ```rust,ignore
/// use faqbot_rag::openai::{OpenAIChatModel, OpenAIConfig};
///
/// let model = OpenAIChatModel::new(OpenAIConfig::from_env()?)?;
/// let reply = model.complete(&[Message::user("Hello")]).await?;
/// ```
pub struct OpenAIChatModel {
    client: reqwest::Client,
    config: OpenAIConfig,
}

impl OpenAIChatModel {
    /// Create a client for `config.chat_model`.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.config.chat_model
    }

    async fn complete(&self, messages: &[Message]) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.config.chat_model,
            message_count = messages.len(),
            "requesting chat completion"
        );

        let request = ChatRequest {
            model: &self.config.chat_model,
            messages,
            temperature: self.config.temperature,
        };
        let response: ChatResponse = post_json(
            &self.client,
            &self.config.url("chat/completions"),
            &self.config.api_key,
            &request,
        )
        .await
        .map_err(|message| {
            debug!(provider = PROVIDER, error = %message, "chat completion failed");
            RagError::ModelError { provider: PROVIDER.into(), message }
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RagError::ModelError {
                provider: PROVIDER.into(),
                message: "API returned no completion".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(OpenAIChatModel::new(OpenAIConfig::new("")).is_err());
        assert!(OpenAIEmbeddingProvider::new(OpenAIConfig::new("")).is_err());
    }

    #[test]
    fn urls_join_cleanly() {
        let mut config = OpenAIConfig::new("sk-test");
        assert_eq!(config.url("embeddings"), "https://api.openai.com/v1/embeddings");
        config.base_url = "http://localhost:11434/v1/".into();
        assert_eq!(config.url("chat/completions"), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn chat_request_serializes_roles_in_lowercase() {
        let messages = [Message::system("ctx"), Message::user("hi")];
        let request = ChatRequest { model: "gpt-3.5-turbo", messages: &messages, temperature: 0.3 };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }

    #[test]
    fn embedding_response_is_reordered_by_index() {
        let body = r#"{"data":[{"index":1,"embedding":[0.0,1.0]},{"index":0,"embedding":[1.0,0.0]}]}"#;
        let response: EmbeddingResponse = serde_json::from_str(body).unwrap();
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        assert_eq!(data[0].embedding, vec![1.0, 0.0]);
    }

    #[test]
    fn api_error_body_is_decoded() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Incorrect API key provided");
    }
}
