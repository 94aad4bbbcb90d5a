use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod openai;

pub use openai::OpenAiClient;

/// Chat message structure (OpenAI-compatible format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

/// Per-request sampling options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// LLM response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub message: ChatMessage,
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Failures talking to a completion endpoint
#[derive(Debug, Error)]
pub enum LlmApiError {
    #[error("no API key configured for {0}")]
    MissingApiKey(String),

    #[error("API request failed: {status} - {body}")]
    Http { status: u16, body: String },

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// LLM client trait - unified interface for completion providers
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model name sent with each request
    fn model(&self) -> &str;

    /// Simple chat completion without tools
    async fn chat_completion(&self, messages: &[ChatMessage], options: &CompletionOptions) -> Result<LlmResponse>;
}
