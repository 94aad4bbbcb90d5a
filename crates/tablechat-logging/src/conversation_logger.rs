use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use tablechat_types::ChatTurn;

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String, // ISO‑8601 Local time
    session_id: &'a str,
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Append-only JSONL transcript of one session's chat turns
pub struct ConversationLogger {
    session_id: String,
    file_path: PathBuf,
    file: Option<tokio::fs::File>,
}

impl ConversationLogger {
    /// Create a new logger; the file name carries the session id and the
    /// current local time.
    pub async fn new(logs_dir: &Path, session_id: &str) -> Result<Self> {
        fs::create_dir_all(logs_dir).await?;

        let filename = format!(
            "tchat-{}-{}.jsonl",
            Local::now().format("%Y-%m-%d-%H%M%S"),
            session_id
        );
        let file_path = logs_dir.join(filename);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;

        Ok(Self {
            session_id: session_id.to_string(),
            file_path,
            file: Some(file),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Append one turn. Write failures are reported but never interrupt
    /// the conversation.
    pub async fn log_turn(&mut self, turn: &ChatTurn, model: Option<&str>, temperature: Option<f32>) {
        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            session_id: &self.session_id,
            role: turn.role().as_str(),
            content: turn.text(),
            model,
            temperature,
        };

        let Some(file) = &mut self.file else {
            return;
        };
        match serde_json::to_string(&entry) {
            Ok(mut json) => {
                json.push('\n');
                if let Err(e) = file.write_all(json.as_bytes()).await {
                    log::error!("Failed to write transcript {}: {}", self.file_path.display(), e);
                } else {
                    let _ = file.flush().await;
                }
            }
            Err(e) => log::error!("Failed to serialize transcript entry: {}", e),
        }
    }

    /// Close the logger. Called when the session ends.
    pub async fn shutdown(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all().await;
        }
    }
}
