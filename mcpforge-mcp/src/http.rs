//! Streamable HTTP transport.
//!
//! Messages are posted to `/mcp` and answered in the response body.
//! Notifications are acknowledged with `202 Accepted`. In session mode the
//! `initialize` response carries an `Mcp-Session-Id` header that every later
//! request must echo. `DELETE /mcp` ends the session, as does a long enough
//! idle period.

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{McpError, McpResult};
use crate::server::McpServer;
use crate::types::{JsonRpcError, JsonRpcMessage, JsonRpcResponse};

/// Header carrying the session id.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Path the transport listens on.
pub const MCP_PATH: &str = "/mcp";

/// Whether the HTTP transport tracks sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Every request stands alone.
    Stateless,
    /// Requests after `initialize` must present a known session id.
    Sessions,
}

/// Sessions idle longer than this are dropped.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Open sessions kept before the least recently used one is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Known session ids with their last activity.
///
/// Sessions end on `DELETE`, after the idle timeout, or when the store is
/// full and a newer session needs the slot.
#[derive(Debug)]
pub struct SessionStore {
    ids: RwLock<HashMap<String, Instant>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: RwLock::new(HashMap::new()),
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Set the idle timeout.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the maximum number of open sessions. At least one is kept.
    #[must_use]
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }

    /// Open a new session and return its id.
    pub fn open(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let mut ids = self.ids.write();

        let timeout = self.idle_timeout;
        ids.retain(|_, seen| seen.elapsed() < timeout);
        while ids.len() >= self.max_sessions {
            let oldest = ids
                .iter()
                .min_by_key(|(_, seen)| **seen)
                .map(|(id, _)| id.clone());
            let Some(oldest) = oldest else { break };
            ids.remove(&oldest);
            tracing::debug!(session = %oldest, "Session evicted");
        }

        ids.insert(id.clone(), Instant::now());
        id
    }

    /// Check that a session is open and record activity on it.
    ///
    /// An expired session is removed and reported as unknown.
    pub fn touch(&self, id: &str) -> bool {
        let mut ids = self.ids.write();
        match ids.get_mut(id) {
            Some(seen) if seen.elapsed() < self.idle_timeout => {
                *seen = Instant::now();
                true
            }
            Some(_) => {
                ids.remove(id);
                tracing::debug!(session = %id, "Session expired");
                false
            }
            None => false,
        }
    }

    /// Close a session. Returns false if it was not open.
    pub fn close(&self, id: &str) -> bool {
        self.ids.write().remove(id).is_some()
    }

    /// Number of sessions held, expired ones included until next pruned.
    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    /// Check if no session is held.
    pub fn is_empty(&self) -> bool {
        self.ids.read().is_empty()
    }
}

#[derive(Clone)]
struct HttpState {
    server: Arc<McpServer>,
    sessions: Option<Arc<SessionStore>>,
}

/// Build the axum router for a server.
pub fn router(server: Arc<McpServer>, mode: SessionMode) -> Router {
    let sessions = match mode {
        SessionMode::Stateless => None,
        SessionMode::Sessions => Some(Arc::new(SessionStore::new())),
    };
    Router::new()
        .route(
            MCP_PATH,
            post(handle_post).delete(handle_delete).get(handle_get),
        )
        .with_state(HttpState { server, sessions })
}

/// Serve the HTTP transport on `addr`.
pub async fn serve_http(server: Arc<McpServer>, addr: SocketAddr, mode: SessionMode) -> McpResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| McpError::Transport(format!("cannot listen on {addr}: {e}")))?;
    tracing::info!(
        server = %server.info().name,
        addr = %listener.local_addr()?,
        ?mode,
        "Serving MCP over HTTP"
    );
    axum::serve(listener, router(server, mode)).await?;
    Ok(())
}

async fn handle_post(State(state): State<HttpState>, headers: HeaderMap, body: String) -> Response {
    let mut new_session = None;

    if let Some(sessions) = &state.sessions {
        let is_initialize = serde_json::from_str::<JsonRpcMessage>(&body)
            .map(|m| m.method() == "initialize")
            .unwrap_or(false);
        if is_initialize {
            new_session = Some(sessions.open());
        } else if !session_id(&headers).is_some_and(|id| sessions.touch(id)) {
            return bad_session();
        }
    }

    let mut response = match state.server.handle_message(&body).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    };

    if let Some(id) = new_session {
        tracing::info!(session = %id, "Session opened");
        if let Ok(value) = HeaderValue::from_str(&id) {
            response.headers_mut().insert(SESSION_HEADER, value);
        }
    }
    response
}

async fn handle_delete(State(state): State<HttpState>, headers: HeaderMap) -> Response {
    let Some(sessions) = &state.sessions else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };
    match session_id(&headers) {
        Some(id) if sessions.close(id) => {
            tracing::info!(session = %id, "Session closed");
            StatusCode::OK.into_response()
        }
        Some(_) => StatusCode::NOT_FOUND.into_response(),
        None => bad_session(),
    }
}

async fn handle_get() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

fn bad_session() -> Response {
    let body = JsonRpcResponse::error(
        None,
        JsonRpcError::SERVER_ERROR,
        "Bad Request: No valid session ID provided",
    );
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
