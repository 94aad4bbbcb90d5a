pub mod factory;
pub use factory::ClientFactory;

/// Backend type for LLM models. All of them speak the OpenAI chat
/// completion protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendType {
    OpenAI,
    Groq,
    Llama,
}

impl BackendType {
    /// Parse backend type from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "groq" => Some(Self::Groq),
            "llama" | "llamacpp" | "llama.cpp" | "llama-cpp" => Some(Self::Llama),
            _ => None,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::OpenAI => "openai",
            Self::Groq => "groq",
            Self::Llama => "llama",
        }
    }

    /// Detect the backend from an API URL, defaulting to OpenAI
    pub fn detect(api_url: Option<&str>) -> Self {
        match api_url {
            Some(url) if url.contains("groq.com") => Self::Groq,
            Some(url) if url.contains("openai.com") => Self::OpenAI,
            Some(_) => Self::Llama,
            None => Self::OpenAI,
        }
    }
}

/// Default OpenAI API URL
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default Groq API URL
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model name
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Get the default URL for a given backend type
pub fn get_default_url_for_backend(backend: &BackendType) -> Option<String> {
    match backend {
        BackendType::OpenAI => Some(OPENAI_API_URL.to_string()),
        BackendType::Groq => Some(GROQ_API_URL.to_string()),
        BackendType::Llama => None, // Llama.cpp doesn't have a default URL
    }
}

/// Normalize API URL by ensuring it has the correct path for OpenAI-compatible endpoints
pub fn normalize_api_url(url: &str) -> String {
    // If URL already contains a path with "completions", use it as-is
    if url.contains("/completions") || url.contains("/chat") {
        return url.to_string();
    }

    if url.ends_with("/v1") {
        return format!("{}/chat/completions", url);
    }

    // If URL ends with a slash, append path without leading slash
    if url.ends_with('/') {
        format!("{}v1/chat/completions", url)
    } else {
        format!("{}/v1/chat/completions", url)
    }
}
