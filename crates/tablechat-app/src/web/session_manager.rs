use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use tablechat_chat::{DispatchError, QueryDispatcher};
use tablechat_data::{load_upload, ChartRequest, ChartSpec, DataError, Dataset};
use tablechat_logging::ConversationLogger;
use tablechat_types::{ChatHistory, Temperature, TemperatureError};

use crate::web::protocol::{Notice, SessionInfo};

pub type SessionId = Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No file uploaded yet. Upload a CSV or XLSX file first.")]
    NoDataset,

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Temperature(#[from] TemperatureError),
}

/// Everything one browser session sees between requests
#[derive(Debug, Default)]
pub struct SessionState {
    pub history: ChatHistory,
    pub dataset: Option<Dataset>,
    pub file_name: Option<String>,
    pub chart: Option<ChartSpec>,
    pub temperature: Temperature,
    pub notice: Option<Notice>,
}

/// Listing fields, kept apart from `SessionState` so the session API never
/// waits on an in-flight agent call.
#[derive(Debug, Clone, Default)]
struct SessionSummary {
    file_name: Option<String>,
    rows: Option<usize>,
    columns: Option<Vec<String>>,
    temperature: Temperature,
    history: ChatHistory,
}

impl SessionSummary {
    fn of(state: &SessionState) -> Self {
        Self {
            file_name: state.file_name.clone(),
            rows: state.dataset.as_ref().map(|d| d.row_count()),
            columns: state.dataset.as_ref().map(|d| d.columns().to_vec()),
            temperature: state.temperature,
            history: state.history.clone(),
        }
    }
}

/// Where and how a session writes its transcript
#[derive(Debug, Clone)]
struct TranscriptConfig {
    dir: PathBuf,
    model: Option<String>,
}

/// A chat session
pub struct Session {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    last_activity: Mutex<DateTime<Utc>>,
    state: Mutex<SessionState>,
    summary: RwLock<SessionSummary>,
    transcript_config: Option<TranscriptConfig>,
    // Opened on the first answered query
    transcript: Mutex<Option<ConversationLogger>>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            last_activity: Mutex::new(Utc::now()),
            state: Mutex::new(SessionState::default()),
            summary: RwLock::new(SessionSummary::default()),
            transcript_config: None,
            transcript: Mutex::new(None),
        }
    }

    fn with_transcript(mut self, dir: PathBuf, model: Option<String>) -> Self {
        self.transcript_config = Some(TranscriptConfig { dir, model });
        self
    }

    pub async fn update_activity(&self) {
        *self.last_activity.lock().await = Utc::now();
    }

    pub async fn last_activity(&self) -> DateTime<Utc> {
        *self.last_activity.lock().await
    }

    /// Locked view of the session state, for rendering
    pub async fn state(&self) -> tokio::sync::MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub async fn set_notice(&self, notice: Notice) {
        self.state.lock().await.notice = Some(notice);
    }

    async fn publish(&self, state: &SessionState) {
        *self.summary.write().await = SessionSummary::of(state);
    }

    /// Replace the dataset with an uploaded file. On failure the previous
    /// dataset stays loaded.
    pub async fn upload(&self, mime: &str, file_name: Option<String>, bytes: &[u8]) -> Result<(), SessionError> {
        self.update_activity().await;
        let dataset = load_upload(mime, bytes)?;
        log::info!(
            "Session {}: loaded {:?} ({} rows, {} columns)",
            self.id,
            file_name,
            dataset.row_count(),
            dataset.column_count()
        );

        let mut state = self.state.lock().await;
        state.dataset = Some(dataset);
        state.file_name = file_name;
        state.chart = None;
        self.publish(&state).await;
        Ok(())
    }

    pub async fn select_chart(&self, request: ChartRequest) -> Result<(), SessionError> {
        self.update_activity().await;
        let mut state = self.state.lock().await;
        let dataset = state.dataset.as_ref().ok_or(SessionError::NoDataset)?;
        let chart = request.build(dataset)?;
        state.chart = Some(chart);
        Ok(())
    }

    pub async fn set_temperature(&self, value: f32) -> Result<(), SessionError> {
        let temperature = Temperature::new(value)?;
        let mut state = self.state.lock().await;
        state.temperature = temperature;
        self.publish(&state).await;
        Ok(())
    }

    /// Run one query through the dispatcher. The stored history is only
    /// replaced when the agent answered; the state lock is held for the whole
    /// call so a session never has two queries in flight.
    pub async fn execute(&self, dispatcher: &QueryDispatcher, query: &str) -> Result<(), SessionError> {
        self.update_activity().await;
        let mut state = self.state.lock().await;
        let dataset = state.dataset.as_ref().ok_or(SessionError::NoDataset)?;

        let next = dispatcher
            .execute(&state.history, dataset, query, state.temperature)
            .await?;

        self.record_turns(&state.history, &next, state.temperature).await;

        state.history = next;
        self.publish(&state).await;
        Ok(())
    }

    async fn record_turns(&self, before: &ChatHistory, after: &ChatHistory, temperature: Temperature) {
        let Some(config) = &self.transcript_config else {
            return;
        };

        let mut transcript = self.transcript.lock().await;
        if transcript.is_none() {
            match ConversationLogger::new(&config.dir, &self.id.to_string()).await {
                Ok(logger) => *transcript = Some(logger),
                Err(e) => {
                    log::error!("Session {}: failed to open transcript: {:#}", self.id, e);
                    return;
                }
            }
        }

        if let Some(logger) = transcript.as_mut() {
            for turn in &after.turns()[before.len()..] {
                logger
                    .log_turn(turn, config.model.as_deref(), Some(temperature.value()))
                    .await;
            }
        }
    }

    pub async fn history(&self) -> ChatHistory {
        self.summary.read().await.history.clone()
    }

    /// Snapshot for the session API. Does not wait for a running query.
    pub async fn get_info(&self) -> SessionInfo {
        let summary = self.summary.read().await.clone();
        let last_activity = *self.last_activity.lock().await;
        let busy = self.state.try_lock().is_err();

        SessionInfo {
            id: self.id,
            created_at: self.created_at.to_rfc3339(),
            last_activity: last_activity.to_rfc3339(),
            busy,
            file_name: summary.file_name,
            rows: summary.rows,
            columns: summary.columns,
            temperature: summary.temperature.value(),
            history: summary.history,
        }
    }

    async fn close(&self) {
        if let Some(logger) = self.transcript.lock().await.as_mut() {
            logger.shutdown().await;
        }
    }
}

/// Manages all active sessions
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    dispatcher: Arc<QueryDispatcher>,
    transcript_dir: Option<PathBuf>,
    model: Option<String>,
}

impl SessionManager {
    pub fn new(dispatcher: Arc<QueryDispatcher>, transcript_dir: Option<PathBuf>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            dispatcher,
            transcript_dir,
            model: None,
        }
    }

    /// Model name written into transcripts
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn dispatcher(&self) -> &QueryDispatcher {
        &self.dispatcher
    }

    /// Create a new web session
    pub async fn create_session(&self) -> Result<Arc<Session>> {
        let session_id = Uuid::new_v4();

        let mut session = Session::new(session_id);
        if let Some(dir) = &self.transcript_dir {
            session = session.with_transcript(dir.clone(), self.model.clone());
        }

        let session = Arc::new(session);
        self.sessions.write().await.insert(session_id, session.clone());
        log::info!("Created session {}", session_id);

        Ok(session)
    }

    /// Get a session by ID
    pub async fn get_session(&self, session_id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// List all active sessions
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();
        let mut infos = Vec::with_capacity(sessions.len());

        for session in sessions {
            infos.push(session.get_info().await);
        }

        // Sort by last activity (most recent first)
        infos.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

        infos
    }

    /// Remove a session; its history is dropped with it. Returns false if no
    /// such session existed.
    pub async fn remove_session(&self, session_id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(session) => {
                session.close().await;
                log::info!("Closed session {}", session_id);
                true
            }
            None => false,
        }
    }

    /// Drop sessions idle for longer than `max_idle`
    pub async fn cleanup_inactive(&self, max_idle: Duration) -> usize {
        self.remove_idle_since(Utc::now() - max_idle).await
    }

    /// Drop sessions whose last activity is before `cutoff`
    pub async fn remove_idle_since(&self, cutoff: DateTime<Utc>) -> usize {
        let sessions: Vec<Arc<Session>> = self.sessions.read().await.values().cloned().collect();

        let mut removed = 0;
        for session in sessions {
            if session.last_activity().await < cutoff && self.remove_session(&session.id).await {
                removed += 1;
            }
        }

        if removed > 0 {
            log::info!("Expired {} idle session(s)", removed);
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
