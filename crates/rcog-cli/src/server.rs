//! HTTP session host.
//!
//! Each session owns one `Orchestrator` behind its own mutex, so steps on a
//! session are serialized while different sessions run independently. Steps
//! run on the blocking pool under a per-request timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use rcog_core::{EngineConfig, EngineError, Orchestrator, RecursiveState};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::AppConfig;

type Session = Arc<std::sync::Mutex<Orchestrator>>;

pub struct AppState {
    sessions: Mutex<HashMap<Uuid, Session>>,
    engine: EngineConfig,
    step_timeout: Duration,
    max_sessions: usize,
}

impl AppState {
    pub fn new(engine: EngineConfig, step_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            engine,
            step_timeout,
            max_sessions,
        }
    }

    async fn session(&self, id: Uuid) -> Result<Session, ApiError> {
        self.sessions
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(ApiError::UnknownSession(id))
    }
}

#[derive(Debug)]
pub enum ApiError {
    UnknownSession(Uuid),
    SessionLimit(usize),
    Timeout(Duration),
    Engine(EngineError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnknownSession(id) => (StatusCode::NOT_FOUND, format!("session {id} not found")),
            ApiError::SessionLimit(max) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("session limit of {max} reached"),
            ),
            ApiError::Timeout(limit) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("step exceeded {}ms", limit.as_millis()),
            ),
            ApiError::Engine(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/state", get(session_state))
        .route("/sessions/{id}/evolve", post(evolve_session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn create_session(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let mut sessions = state.sessions.lock().await;
    if sessions.len() >= state.max_sessions {
        tracing::warn!(max = state.max_sessions, "session limit reached");
        return Err(ApiError::SessionLimit(state.max_sessions));
    }
    let orchestrator = Orchestrator::new(state.engine.clone()).map_err(ApiError::Engine)?;
    let id = Uuid::new_v4();
    sessions.insert(id, Arc::new(std::sync::Mutex::new(orchestrator)));
    tracing::info!(session = %id, active = sessions.len(), "session created");
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Drop a session. A step already running on it finishes in the background.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .lock()
        .await
        .remove(&id)
        .ok_or(ApiError::UnknownSession(id))?;
    tracing::info!(session = %id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Run `f` against a session on the blocking pool, bounded by the step
/// timeout. A timed-out step still completes in the background.
async fn with_session<F>(state: &AppState, id: Uuid, f: F) -> Result<RecursiveState, ApiError>
where
    F: FnOnce(&mut Orchestrator) -> Result<RecursiveState, EngineError> + Send + 'static,
{
    let session = state.session(id).await?;
    let task = tokio::task::spawn_blocking(move || {
        let mut orchestrator = session
            .lock()
            .map_err(|_| ApiError::Internal("session lock poisoned".to_string()))?;
        f(&mut *orchestrator).map_err(ApiError::Engine)
    });

    match tokio::time::timeout(state.step_timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ApiError::Internal(join_err.to_string())),
        Err(_) => {
            tracing::warn!(session = %id, timeout_ms = state.step_timeout.as_millis() as u64, "step timed out");
            Err(ApiError::Timeout(state.step_timeout))
        }
    }
}

async fn session_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecursiveState>, ApiError> {
    with_session(&state, id, |orch| Ok(orch.current_state()))
        .await
        .map(Json)
}

async fn evolve_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecursiveState>, ApiError> {
    with_session(&state, id, |orch| orch.evolve()).await.map(Json)
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(
        config.engine,
        config.server.step_timeout(),
        config.server.max_sessions,
    ));
    let listener = tokio::net::TcpListener::bind(config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn app_state(step_timeout: Duration) -> Arc<AppState> {
        Arc::new(AppState::new(EngineConfig::with_seed(42), step_timeout, 8))
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/sessions").await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_create_then_read_state() {
        let app = router(app_state(Duration::from_secs(5)));
        let id = create(&app).await;

        let (status, state) = send(&app, "GET", &format!("/sessions/{id}/state")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["iteration"], 0);
        assert_eq!(state["knowledge_nodes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_evolve_advances_one_session_only() {
        let app = router(app_state(Duration::from_secs(5)));
        let a = create(&app).await;
        let b = create(&app).await;

        for expected in 1..=3 {
            let (status, state) = send(&app, "POST", &format!("/sessions/{a}/evolve")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(state["iteration"], expected);
        }
        let (_, other) = send(&app, "GET", &format!("/sessions/{b}/state")).await;
        assert_eq!(other["iteration"], 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let app = router(app_state(Duration::from_secs(5)));
        let id = Uuid::new_v4();
        let (status, body) = send(&app, "POST", &format!("/sessions/{id}/evolve")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));

        let (status, _) = send(&app, "GET", &format!("/sessions/{id}/state")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_session_id_rejected() {
        let app = router(app_state(Duration::from_secs(5)));
        let (status, _) = send(&app, "GET", "/sessions/not-a-uuid/state").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_frees_session() {
        let app = router(app_state(Duration::from_secs(5)));
        let id = create(&app).await;

        let (status, _) = send(&app, "DELETE", &format!("/sessions/{id}")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/sessions/{id}/state")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &format!("/sessions/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_limit() {
        let state = Arc::new(AppState::new(
            EngineConfig::with_seed(42),
            Duration::from_secs(5),
            2,
        ));
        let app = router(state);
        let first = create(&app).await;
        create(&app).await;

        let (status, body) = send(&app, "POST", "/sessions").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "session limit of 2 reached");

        send(&app, "DELETE", &format!("/sessions/{first}")).await;
        create(&app).await;
    }

    #[tokio::test]
    async fn test_blocked_step_times_out() {
        let state = app_state(Duration::from_millis(50));
        let app = router(state.clone());
        let id = create(&app).await;

        let session = state.session(Uuid::parse_str(&id).unwrap()).await.unwrap();
        let guard = session.lock().unwrap();
        let (status, body) = send(&app, "POST", &format!("/sessions/{id}/evolve")).await;
        drop(guard);

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "step exceeded 50ms");
    }
}
