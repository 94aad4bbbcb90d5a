use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tablechat_logging::{log_request_to_file, log_response_to_file};

use super::{ChatMessage, CompletionOptions, LlmApiError, LlmClient, LlmResponse, TokenUsage};

/// Client for any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiClient {
    api_key: Option<String>,
    model: String,
    api_url: String,
    require_key: bool,
    request_log_dir: Option<PathBuf>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, model: String, api_url: String) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            api_url,
            require_key: true,
            request_log_dir: None,
            client: reqwest::Client::new(),
        }
    }

    /// Self-hosted servers (llama.cpp) accept unauthenticated requests.
    pub fn without_required_key(mut self) -> Self {
        self.require_key = false;
        self
    }

    /// Write every request/response pair to `dir`.
    pub fn with_request_logging(mut self, dir: PathBuf) -> Self {
        self.request_log_dir = Some(dir);
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat_completion(&self, messages: &[ChatMessage], options: &CompletionOptions) -> Result<LlmResponse> {
        if self.require_key && self.api_key.is_none() {
            return Err(LlmApiError::MissingApiKey(self.api_url.clone()).into());
        }

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let api_key = self.api_key.as_deref().unwrap_or("");
        let log_stamp = self.request_log_dir.as_ref().and_then(|dir| {
            log_request_to_file(dir, &self.api_url, &request, &self.model, api_key)
                .map_err(|e| log::warn!("Could not write request log: {:#}", e))
                .ok()
                .map(|(_, ts)| ts)
        });

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        log::debug!("POST {} (model {}, {} messages)", self.api_url, self.model, messages.len());
        let response = builder.send().await.map_err(|source| LlmApiError::Transport {
            url: self.api_url.clone(),
            source,
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|source| LlmApiError::Transport {
            url: self.api_url.clone(),
            source,
        })?;

        if let (Some(dir), Some(ts)) = (&self.request_log_dir, log_stamp) {
            if let Err(e) = log_response_to_file(dir, status, &response_text, ts, &self.model) {
                log::warn!("Could not write response log: {:#}", e);
            }
        }

        if !status.is_success() {
            return Err(LlmApiError::Http {
                status: status.as_u16(),
                body: response_text,
            }
            .into());
        }

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmApiError::MalformedResponse(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmApiError::MalformedResponse("no choices in response".to_string()))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmApiError::MalformedResponse("no content in response".to_string()))?;

        Ok(LlmResponse {
            message: ChatMessage {
                role: choice.message.role.unwrap_or_else(|| "assistant".to_string()),
                content,
            },
            usage: chat_response.usage.map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }),
        })
    }
}
