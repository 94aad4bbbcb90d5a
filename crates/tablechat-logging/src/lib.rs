// Logging module - conversation transcripts and request logging
pub mod conversation_logger;
pub mod request_logger;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub use conversation_logger::ConversationLogger;
pub use request_logger::{log_request_to_file, log_response_to_file, mask_api_key};

/// Safely truncate a string to a maximum number of characters
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        // Reserve space for "..." suffix
        let trunc_chars = max_chars.saturating_sub(3);
        format!("{}...", s.chars().take(trunc_chars).collect::<String>())
    }
}

/// Get or create the base tablechat directory (~/.tablechat)
pub fn get_tablechat_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Failed to get home directory")?;

    ensure_dir(PathBuf::from(home_dir).join(".tablechat"))
}

/// Get or create the logs directory (~/.tablechat/logs)
pub fn get_logs_dir() -> Result<PathBuf> {
    ensure_dir(get_tablechat_dir()?.join("logs"))
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(dir)
}

/// File-name friendly form of a model name (`openai/gpt-4o` -> `openai-gpt-4o`)
pub fn file_safe(name: &str) -> String {
    name.replace(['/', '\\', ':'], "-")
}
