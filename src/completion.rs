//! Completion client
//!
//! Thin adapter over the external chat-completion service. One prompt in,
//! raw response text out; every failure mode collapses into a service-error
//! variant for the retry controller. Deliberately retry-free: backoff and
//! retry policy live in one place, the coach loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CoachConfig;
use crate::text::truncate_chars;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// How far error-body excerpts are trimmed before surfacing.
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Failure modes of the completion service boundary.
#[derive(Debug)]
pub enum CompletionError {
    Auth(String),
    Quota(String),
    Network(String),
    Malformed(String),
    Api(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompletionError::Auth(details) => {
                write!(f, "authentication rejected: {}", details)
            }
            CompletionError::Quota(details) => {
                write!(f, "quota or rate limit exhausted: {}", details)
            }
            CompletionError::Network(details) => {
                write!(f, "network failure: {}", details)
            }
            CompletionError::Malformed(details) => {
                write!(f, "malformed service response: {}", details)
            }
            CompletionError::Api(details) => {
                write!(f, "service error: {}", details)
            }
        }
    }
}

impl std::error::Error for CompletionError {}

/// Boundary for text completion. The coach depends on this trait, never on
/// a concrete HTTP client, so attempts can be scripted in tests.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// OpenAI chat-completions implementation of [`CompletionBackend`].
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiBackend {
    /// Builds a backend from explicit configuration. Fails fast when no API
    /// key was provided rather than at the first request.
    pub fn new(config: &CoachConfig) -> Result<Self, CompletionError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            CompletionError::Auth("no API key configured; set OPENAI_API_KEY".to_string())
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(OPENAI_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        if !status.is_success() {
            let preview = truncate_chars(&body, ERROR_BODY_PREVIEW_CHARS).to_string();
            return Err(match status.as_u16() {
                401 | 403 => CompletionError::Auth(preview),
                429 => CompletionError::Quota(preview),
                _ => CompletionError::Api(format!("HTTP {}: {}", status, preview)),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        parsed
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| CompletionError::Malformed("response contained no choices".to_string()))
    }
}
