//! # tablechat-llm-api
//!
//! A small interface for OpenAI-compatible chat completion services:
//! - OpenAI
//! - Groq
//! - llama.cpp (self-hosted)
//!
//! ## Example
//!
//! ```rust,no_run
//! use tablechat_llm_api::{BackendType, ClientFactory};
//! use tablechat_llm_api::client::{ChatMessage, CompletionOptions, LlmClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ClientFactory::create(
//!         BackendType::OpenAI,
//!         Some("your-api-key".to_string()),
//!         "gpt-3.5-turbo".to_string(),
//!         None,
//!     );
//!
//!     let messages = vec![ChatMessage::user("Hello!")];
//!     let options = CompletionOptions { temperature: Some(0.5), max_tokens: None };
//!     let response = client.chat_completion(&messages, &options).await?;
//!     println!("Response: {}", response.message.content);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;


pub use client::{
    ChatMessage,
    CompletionOptions,
    LlmApiError,
    LlmClient,
    LlmResponse,
    TokenUsage,
};

pub use config::{
    BackendType,
    ClientFactory,
    DEFAULT_MODEL,
    GROQ_API_URL,
    OPENAI_API_URL,
    normalize_api_url,
    get_default_url_for_backend,
};
