//! Chat-completion client for the local language model.
//!
//! The model server (LM Studio or anything OpenAI-compatible) is treated as
//! an opaque endpoint: one POST per prompt, first choice's content is the
//! answer. There is no retry; callers decide how to degrade.
//!
//! # Architecture
//!
//! - [`AskAsync`]: the seam the translator and summarizer depend on
//! - [`ChatClient`]: the `reqwest` implementation

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::LmSettings;
use crate::error::AskError;

/// One request to the model: a system instruction plus a user message.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Async access to a chat model.
pub trait AskAsync {
    /// Send `prompt` and return the trimmed text of the first choice.
    fn ask(&self, prompt: &Prompt) -> impl Future<Output = Result<String, AskError>> + Send;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// [`AskAsync`] over an OpenAI-compatible `/v1/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl ChatClient {
    pub fn new(settings: &LmSettings) -> Result<Self, AskError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(AskError::Request)?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
        })
    }

    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, AskError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status(status));
        }
        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AskError::Malformed("response has no choices".to_string()))
    }
}

impl AskAsync for ChatClient {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint, max_tokens = prompt.max_tokens))]
    async fn ask(&self, prompt: &Prompt) -> Result<String, AskError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
        };

        let result = self.complete(&request).await;

        let elapsed_ms = t0.elapsed().as_millis();
        match &result {
            Ok(text) => debug!(elapsed_ms, chars = text.chars().count(), "Completion received"),
            Err(e) => warn!(elapsed_ms, error = %e, "Completion failed"),
        }
        result
    }
}
