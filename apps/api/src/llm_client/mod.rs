//! LLM Client: the single point of entry for calls to the chat-completion endpoint.
//!
//! No other module talks to the summarization service directly. Handlers go
//! through the `Summarizer` trait, which `LlmClient` implements.
//!
//! One request per call: no retry, no backoff, no caching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_ENDPOINT: &str = "https://api.deepinfra.com/v1/openai/chat/completions";
/// The model used for every summary.
pub const MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.1";
const TEMPERATURE: f64 = 0.3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Returned when the service answers with no choices.
pub const EMPTY_RESPONSE: &str = "No response";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Invalid summarization endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Summarization API key is empty")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by the summarization service: {body}")]
    RateLimited { body: String },

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Turns a prompt into summary text.
/// Carried in `AppState` as `Arc<dyn Summarizer>`.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl LlmClient {
    /// Fails on a blank key or an endpoint that is not an http(s) URL.
    pub fn new(endpoint: &str, api_key: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let endpoint_str = endpoint
            .trim()
            .lines()
            .map(str::trim)
            .collect::<String>();
        let url = Url::parse(&endpoint_str).map_err(|e| LlmError::InvalidEndpoint {
            endpoint: endpoint_str.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LlmError::InvalidEndpoint {
                endpoint: endpoint_str,
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint: url,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Makes one chat-completion call and returns the parsed response.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!("Summary request: {} prompt bytes", prompt.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() == 429 {
            warn!("Summarization API rate limited the request: {body}");
            return Err(LlmError::RateLimited { body });
        }

        if status.as_u16() != 200 {
            warn!("Summarization API returned {status}: {body}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        debug!(
            "Summary call succeeded: {} choice(s), {} response bytes",
            parsed.choices.len(),
            body.len()
        );
        Ok(parsed)
    }
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn summarize(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, prompts::SUMMARY_SYSTEM).await?;
        Ok(response.text().unwrap_or(EMPTY_RESPONSE).to_string())
    }
}
