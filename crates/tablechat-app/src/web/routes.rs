use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use tablechat_data::{ChartKind, ChartRequest};

use crate::web::{
    protocol::{ChartForm, ExecuteForm, Notice, SessionInfo, SettingsForm},
    render::render_page,
    session_manager::{Session, SessionId, SessionManager},
};

/// Application state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub session_manager: Arc<SessionManager>,
    pub preview_rows: usize,
    pub max_upload_bytes: usize,
}

/// Create router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        // API routes
        .route("/api/sessions", get(list_sessions))
        .route(
            "/api/sessions/:id",
            get(get_session_details).delete(close_session),
        )
        // Pages and form actions
        .route("/", get(serve_index))
        .route("/session/:id", get(serve_session))
        .route(
            "/session/:id/upload",
            post(upload_file)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(upload_limit)),
        )
        .route("/session/:id/chart", post(select_chart))
        .route("/session/:id/execute", post(execute_query))
        .route("/session/:id/settings", post(update_settings))
        .with_state(state)
}

fn session_page(id: SessionId) -> Redirect {
    Redirect::to(&format!("/session/{}", id))
}

async fn find_session(state: &AppState, id: &SessionId) -> Result<Arc<Session>, AppError> {
    state
        .session_manager
        .get_session(id)
        .await
        .ok_or_else(|| AppError::NotFound("Session not found".into()))
}

/// GET /api/sessions - List all active sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.session_manager.list_sessions().await;
    Json(serde_json::json!({ "sessions": sessions }))
}

/// GET /api/sessions/:id - Get session details
async fn get_session_details(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionInfo>, AppError> {
    let session = find_session(&state, &id).await?;
    Ok(Json(session.get_info().await))
}

/// DELETE /api/sessions/:id - End a session
async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.session_manager.remove_session(&id).await {
        return Err(AppError::NotFound("Session not found".into()));
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Session closed successfully",
    })))
}

/// GET / - Start a new session
async fn serve_index(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let session = state.session_manager.create_session().await?;
    Ok(session_page(session.id))
}

/// GET /session/:id - Render the session page. The pending notice is shown once.
async fn serve_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Html<String>, AppError> {
    let session = find_session(&state, &id).await?;
    session.update_activity().await;

    let mut session_state = session.state().await;
    let html = render_page(id, &session_state, state.preview_rows);
    session_state.notice = None;

    Ok(Html(html))
}

/// POST /session/:id/upload - Load a CSV or XLSX file
async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let session = find_session(&state, &id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let mime = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, mime, bytes));
        break;
    }

    let notice = match upload {
        Some((_, _, bytes)) if bytes.is_empty() => Notice::Warning("No file uploaded yet.".to_string()),
        Some((file_name, mime, bytes)) => {
            let label = file_name.clone().unwrap_or_else(|| "upload".to_string());
            match session.upload(&mime, file_name, &bytes).await {
                Ok(()) => Notice::Success(format!("Loaded {}", label)),
                Err(e) => {
                    log::warn!("Session {}: upload of {} ({}) rejected: {}", id, label, mime, e);
                    Notice::Error(e.to_string())
                }
            }
        }
        None => Notice::Warning("No file uploaded yet.".to_string()),
    };
    session.set_notice(notice).await;

    Ok(session_page(id))
}

/// POST /session/:id/chart - Build the selected chart
async fn select_chart(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Form(form): Form<ChartForm>,
) -> Result<Redirect, AppError> {
    let session = find_session(&state, &id).await?;

    let kind = ChartKind::from_str(&form.chart_type).map_err(AppError::BadRequest)?;
    let request = ChartRequest::new(kind, form.x_column, form.y_column);
    if let Err(e) = session.select_chart(request).await {
        session.set_notice(Notice::Error(e.to_string())).await;
    }

    Ok(session_page(id))
}

/// POST /session/:id/execute - Ask the agent a question
async fn execute_query(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Form(form): Form<ExecuteForm>,
) -> Result<Redirect, AppError> {
    let session = find_session(&state, &id).await?;

    if let Some(temperature) = form.temperature {
        if let Err(e) = session.set_temperature(temperature).await {
            session.set_notice(Notice::Error(e.to_string())).await;
            return Ok(session_page(id));
        }
    }

    let dispatcher = state.session_manager.dispatcher();
    if let Err(e) = session.execute(dispatcher, &form.query).await {
        session.set_notice(Notice::Error(e.to_string())).await;
    }

    Ok(session_page(id))
}

/// POST /session/:id/settings - Change the sampling temperature
async fn update_settings(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, AppError> {
    let session = find_session(&state, &id).await?;

    let notice = match session.set_temperature(form.temperature).await {
        Ok(()) => {
            let temperature = session.state().await.temperature;
            if temperature.may_hallucinate() {
                Notice::Warning(format!(
                    "Temperature set to {}. Anything above {} may produce hallucinations",
                    temperature,
                    tablechat_types::HALLUCINATION_THRESHOLD
                ))
            } else {
                Notice::Success(format!("Temperature set to {}", temperature))
            }
        }
        Err(e) => Notice::Error(e.to_string()),
    };
    session.set_notice(notice).await;

    Ok(session_page(id))
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    Anyhow(anyhow::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Anyhow(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
