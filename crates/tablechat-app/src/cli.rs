use clap::Parser;
use std::path::PathBuf;

use tablechat_chat::MAX_CONTEXT_ROWS;
use tablechat_types::PREVIEW_ROWS;

/// CLI arguments for tablechat
#[derive(Parser, Debug, Clone)]
#[command(name = "tablechat")]
#[command(about = "Table Agent - upload a spreadsheet, chart it, and ask questions about it")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Address to bind the web server to
    #[arg(long, env = "TABLECHAT_BIND", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, env = "TABLECHAT_PORT", default_value_t = 8501)]
    pub port: u16,

    /// Chat completion endpoint (e.g., https://api.openai.com or http://localhost:8080)
    #[arg(long, env = "TABLECHAT_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Backend type: openai, groq or llama
    #[arg(long, env = "TABLECHAT_BACKEND", value_name = "BACKEND")]
    pub backend: Option<String>,

    /// Model name
    #[arg(short, long, env = "TABLECHAT_MODEL", value_name = "MODEL")]
    pub model: Option<String>,

    /// API key for the reasoning service
    #[arg(long, env = "TABLECHAT_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// TOML file holding `openai_api_key` (and optionally `api_url`, `model`)
    #[arg(long, env = "TABLECHAT_SECRETS", default_value = "secrets.toml", value_name = "FILE")]
    pub secrets_file: PathBuf,

    /// Write every request/response and per-session transcripts to ~/.tablechat/logs
    #[arg(long, env = "TABLECHAT_LOG_REQUESTS")]
    pub log_requests: bool,

    /// Rows shown in the data preview
    #[arg(long, default_value_t = PREVIEW_ROWS)]
    pub preview_rows: usize,

    /// Table rows handed to the agent with each question
    #[arg(long, default_value_t = MAX_CONTEXT_ROWS)]
    pub context_rows: usize,

    /// Maximum tokens in an answer
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value_t = 200)]
    pub max_upload_mb: usize,

    /// Minutes a session may sit idle before it is dropped
    #[arg(long, env = "TABLECHAT_SESSION_IDLE_MINUTES", default_value_t = 60)]
    pub session_idle_minutes: u64,

    /// Replace the instruction line at the top of every prompt
    #[arg(long, value_name = "TEXT")]
    pub instructions: Option<String>,
}
