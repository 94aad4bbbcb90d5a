use serde::{Deserialize, Serialize};

use tablechat_types::ChatHistory;

use crate::web::session_manager::SessionId;

/// One-shot message shown on the next page render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn css_class(&self) -> &'static str {
        match self {
            Notice::Success(_) => "notice success",
            Notice::Warning(_) => "notice warning",
            Notice::Error(_) => "notice error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

/// Chart selection form
#[derive(Debug, Clone, Deserialize)]
pub struct ChartForm {
    pub chart_type: String,
    pub x_column: String,
    pub y_column: String,
}

/// Query form. The temperature slider is submitted alongside the query.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteForm {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsForm {
    pub temperature: f32,
}

/// Session information for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub created_at: String,
    pub last_activity: String,
    /// A query is being answered right now
    pub busy: bool,
    pub file_name: Option<String>,
    pub rows: Option<usize>,
    pub columns: Option<Vec<String>>,
    pub temperature: f32,
    pub history: ChatHistory,
}
