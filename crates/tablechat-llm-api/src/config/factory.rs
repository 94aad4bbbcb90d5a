use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{LlmClient, OpenAiClient};
use crate::config::{get_default_url_for_backend, normalize_api_url, BackendType};

/// Fallback address for a self-hosted llama.cpp server
pub const DEFAULT_LLAMA_URL: &str = "http://localhost:8080";

/// Client factory for creating LLM clients
pub struct ClientFactory;

impl ClientFactory {
    /// Create an LLM client based on the specified backend type
    ///
    /// # Arguments
    /// * `backend` - The backend type to use (OpenAI, Groq, Llama)
    /// * `api_key` - API key for authentication (optional for llama.cpp)
    /// * `model` - Model name to use
    /// * `api_url` - Optional custom API URL (uses the backend default if None)
    pub fn create(
        backend: BackendType,
        api_key: Option<String>,
        model: String,
        api_url: Option<String>,
    ) -> Arc<dyn LlmClient> {
        Arc::new(Self::build(backend, api_key, model, api_url, None))
    }

    /// Same as [`ClientFactory::create`], optionally writing request and
    /// response logs to `request_log_dir`.
    pub fn create_with_logging(
        backend: BackendType,
        api_key: Option<String>,
        model: String,
        api_url: Option<String>,
        request_log_dir: Option<PathBuf>,
    ) -> Arc<dyn LlmClient> {
        Arc::new(Self::build(backend, api_key, model, api_url, request_log_dir))
    }

    fn build(
        backend: BackendType,
        api_key: Option<String>,
        model: String,
        api_url: Option<String>,
        request_log_dir: Option<PathBuf>,
    ) -> OpenAiClient {
        let url = api_url
            .or_else(|| get_default_url_for_backend(&backend))
            .unwrap_or_else(|| DEFAULT_LLAMA_URL.to_string());
        let url = normalize_api_url(&url);

        log::info!("Using {} backend at {} with model {}", backend.as_str(), url, model);

        let mut client = OpenAiClient::new(api_key, model, url);
        if backend == BackendType::Llama {
            client = client.without_required_key();
        }
        if let Some(dir) = request_log_dir {
            client = client.with_request_logging(dir);
        }
        client
    }
}
