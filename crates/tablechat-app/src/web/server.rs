use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tablechat_chat::QueryDispatcher;

use crate::web::{routes, session_manager::SessionManager};

/// Web server configuration
pub struct WebServerConfig {
    pub bind_addr: SocketAddr,
    pub dispatcher: Arc<QueryDispatcher>,
    pub preview_rows: usize,
    pub max_upload_bytes: usize,
    pub transcript_dir: Option<PathBuf>,
    pub model: String,
    /// Sessions idle this long are dropped
    pub session_idle: Duration,
}

/// Web server instance
pub struct WebServer {
    config: WebServerConfig,
    session_manager: Arc<SessionManager>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(config: WebServerConfig) -> Self {
        let session_manager = Arc::new(
            SessionManager::new(config.dispatcher.clone(), config.transcript_dir.clone())
                .with_model(config.model.clone()),
        );

        Self {
            config,
            session_manager,
        }
    }

    /// Start the web server
    pub async fn start(self) -> Result<()> {
        let app_state = routes::AppState {
            session_manager: self.session_manager.clone(),
            preview_rows: self.config.preview_rows,
            max_upload_bytes: self.config.max_upload_bytes,
        };

        let app = routes::create_router(app_state);

        spawn_idle_sweep(self.session_manager.clone(), self.config.session_idle);

        println!("🌐 Web server starting on http://{}", self.config.bind_addr);
        println!("   API endpoints: http://{}/api/sessions", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn session_manager(&self) -> Arc<SessionManager> {
        self.session_manager.clone()
    }
}

/// Periodically drop sessions that have been idle longer than `max_idle`
fn spawn_idle_sweep(session_manager: Arc<SessionManager>, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    let period = (max_idle / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    let max_idle = chrono::Duration::from_std(max_idle).unwrap_or_else(|_| chrono::Duration::weeks(52));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            session_manager.cleanup_inactive(max_idle).await;
        }
    })
}
