//! Remote inference client
//!
//! One-shot request/response against an Anthropic-style messages endpoint.
//! Each request is stateless: a single user message, a fixed system
//! instruction, and a token cap. No streaming, no retries, no explicit
//! timeout beyond the transport default.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::RemoteConfig;
use crate::{Error, Result};

/// Protocol version marker the endpoint requires
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request body for the messages endpoint
#[derive(serde::Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    system: &'a str,
}

/// A single chat message
#[derive(serde::Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Expected response shape: `{content: [{text}, ...]}`
#[derive(serde::Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(serde::Deserialize)]
struct ContentBlock {
    text: String,
}

/// Single-shot text inference. Implemented by the HTTP client and by
/// test doubles standing in for it.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Produce a response for one utterance.
    ///
    /// # Errors
    ///
    /// Returns `RemoteTransport` on network-level failures and
    /// `RemoteMalformed` when the expected text field is absent.
    async fn infer(&self, text: &str) -> Result<String>;
}

/// HTTP client for the remote text-generation service
#[derive(Debug)]
pub struct RemoteInference {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl RemoteInference {
    /// Create a client from the remote configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        if config.api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "API key required for remote inference".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }

    /// Extract the first text block from a raw response body
    fn extract_text(body: &str) -> Result<String> {
        let parsed: MessagesResponse = serde_json::from_str(body)
            .map_err(|e| Error::RemoteMalformed(format!("unexpected response shape: {e}")))?;

        parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| Error::RemoteMalformed("empty content array".to_string()))
    }
}

/// Client used when no API key is configured. Every request fails as a
/// transport error, so local rules keep working and unmatched utterances
/// collapse to the apology instead of the session refusing to start.
pub struct OfflineClient;

#[async_trait]
impl InferenceClient for OfflineClient {
    async fn infer(&self, _text: &str) -> Result<String> {
        Err(Error::RemoteTransport("no API key configured".to_string()))
    }
}

#[async_trait]
impl InferenceClient for RemoteInference {
    async fn infer(&self, text: &str) -> Result<String> {
        tracing::debug!(chars = text.len(), model = %self.model, "dispatching inference request");

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: text,
            }],
            system: &self.system_prompt,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "inference request failed");
                Error::RemoteTransport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "inference API error");
            return Err(Error::RemoteTransport(format!("API error {status}: {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::RemoteTransport(e.to_string()))?;

        let text = Self::extract_text(&body)?;
        tracing::info!(chars = text.len(), "inference response received");
        Ok(text)
    }
}
