//! HTTP gateway: POST /chat → agent turn → JSON response.
//!
//! Request validation (400 for a missing or blank message), 503 when the turn
//! fails or exceeds its wall-clock budget. Bodies use the camelCase shape the
//! browser client already speaks.

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;

use crate::agent::{Agent, MESSAGE_REQUIRED_TEXT, TurnOutcome};
use crate::error::ChatError;
use crate::observability::SessionEvent;

/// Default wall-clock budget for one chat turn (completions + searches).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

const HEALTH_MESSAGE: &str = "BaatChit AI Backend is running!";
const FEATURES: [&str; 4] = ["AI Chat", "Conversation Memory", "Web Search", "Session Expiry"];

/// Request body for POST /chat.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// User message; required and non-blank.
    #[serde(default)]
    pub message: Option<String>,
    /// Session to continue; absent or unknown starts a new one.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Success body for POST /chat.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub status: &'static str,
    pub message: String,
    pub session_id: String,
    pub conversation_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
}

impl From<TurnOutcome> for ChatResponse {
    fn from(outcome: TurnOutcome) -> Self {
        Self {
            status: "success",
            message: outcome.reply,
            session_id: outcome.session_id,
            conversation_length: outcome.conversation_length,
            tools_used: (!outcome.tools_used.is_empty()).then_some(outcome.tools_used),
        }
    }
}

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error: String,
}

type ErrorReply = (StatusCode, Json<ErrorResponse>);

fn error_reply(error: &ChatError) -> ErrorReply {
    let status = if error.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ErrorResponse {
            status: "error",
            error: error.user_message().to_string(),
        }),
    )
}

/// Shared state for the HTTP server: agent + per-turn timeout + optional concurrency limit.
#[derive(Clone)]
pub struct GatewayState {
    pub agent: Arc<Agent>,
    pub request_timeout_secs: u64,
    /// When Some, limits concurrent agent turns; excess requests wait for a slot.
    pub concurrency_semaphore: Option<Arc<Semaphore>>,
    pub max_concurrent_turns: Option<usize>,
}

/// Store counters reported by GET /health.
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub keys: usize,
    pub created: u64,
    pub expired: u64,
    pub resets: u64,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub features: [&'static str; 4],
    pub active_conversations: usize,
    pub cache_stats: CacheStatsResponse,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_turns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight_turns: Option<usize>,
}

/// Response body for DELETE /sessions/{session_id}.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: &'static str,
    pub reset: bool,
}

/// Validate request body; returns `(session_id, message)` or a 400 reply.
pub fn validate_chat_request(
    body: &ChatRequest,
) -> Result<(Option<String>, String), (StatusCode, Json<ErrorResponse>)> {
    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .ok_or_else(|| error_reply(&ChatError::Validation(MESSAGE_REQUIRED_TEXT.to_string())))?;
    let session_id = body
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    Ok((session_id, message.to_string()))
}

async fn handle_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ErrorReply> {
    let (session_id, message) = validate_chat_request(&body).inspect_err(|_| {
        tracing::debug!(
            event = SessionEvent::GatewayRequestRejected.as_str(),
            "chat request rejected: message is required"
        );
    })?;
    let timeout_secs = state.request_timeout_secs;
    // The budget covers waiting for a concurrency slot as well as the turn itself.
    let turn = async {
        let _permit = match state.concurrency_semaphore {
            Some(ref sem) => match sem.acquire().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    return Err(ChatError::ServiceUnavailable(
                        "concurrency limit closed".to_string(),
                    ));
                }
            },
            None => None,
        };
        state.agent.run_turn(session_id.as_deref(), &message).await
    };
    match tokio::time::timeout(Duration::from_secs(timeout_secs), turn).await {
        Ok(Ok(outcome)) => Ok(Json(ChatResponse::from(outcome))),
        Ok(Err(error)) => Err(error_reply(&error)),
        Err(_) => {
            tracing::warn!(
                event = SessionEvent::GatewayRequestTimedOut.as_str(),
                session_id = session_id.as_deref().unwrap_or("<new>"),
                timeout_secs,
                "chat turn timed out"
            );
            Err(error_reply(&ChatError::ServiceUnavailable(format!(
                "chat turn timed out after {timeout_secs}s"
            ))))
        }
    }
}

async fn handle_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let stats = state.agent.stats().await;
    let in_flight_turns = state.max_concurrent_turns.and_then(|max| {
        state
            .concurrency_semaphore
            .as_ref()
            .map(|sem| max.saturating_sub(sem.available_permits()))
    });
    Json(HealthResponse {
        status: "success",
        message: HEALTH_MESSAGE,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        features: FEATURES,
        active_conversations: stats.active_count,
        cache_stats: CacheStatsResponse {
            hits: stats.hits,
            misses: stats.misses,
            keys: stats.active_count,
            created: stats.created,
            expired: stats.expired,
            resets: stats.resets,
        },
        request_timeout_secs: state.request_timeout_secs,
        max_concurrent_turns: state.max_concurrent_turns,
        in_flight_turns,
    })
}

async fn handle_reset(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Json<ResetResponse> {
    let reset = state.agent.reset_session(&session_id).await;
    Json(ResetResponse {
        status: "success",
        reset,
    })
}

/// Build the gateway router (POST /chat, GET /health, DELETE /sessions/{session_id}).
pub fn router(
    agent: Arc<Agent>,
    request_timeout_secs: u64,
    max_concurrent_turns: Option<usize>,
) -> Router {
    let max_concurrent_turns = max_concurrent_turns.filter(|n| *n > 0);
    let concurrency_semaphore = max_concurrent_turns.map(|n| Arc::new(Semaphore::new(n)));
    let state = GatewayState {
        agent,
        request_timeout_secs: request_timeout_secs.max(1),
        concurrency_semaphore,
        max_concurrent_turns,
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/chat", post(handle_chat))
        .route("/sessions/{session_id}", delete(handle_reset))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the HTTP server; binds to `bind_addr` (e.g. `0.0.0.0:8000`).
/// Graceful shutdown on Ctrl+C (SIGINT) and SIGTERM (Unix); in-flight requests complete before exit.
/// The session sweeper runs for the lifetime of the server.
pub async fn run_http(
    agent: Agent,
    bind_addr: &str,
    request_timeout_secs: Option<u64>,
    max_concurrent_turns: Option<usize>,
) -> Result<()> {
    let timeout = request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    let sweeper = agent
        .store()
        .spawn_sweeper(agent.config().session.sweep_interval());
    let app = router(Arc::new(agent), timeout, max_concurrent_turns);
    let listener = TcpListener::bind(bind_addr).await?;
    let max_str = max_concurrent_turns
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unlimited".to_string());
    tracing::info!(
        event = SessionEvent::GatewayListening.as_str(),
        "gateway listening on {} (request_timeout={}s, max_concurrent={}, Ctrl+C/SIGTERM to stop)",
        bind_addr,
        timeout,
        max_str
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sweeper.shutdown();
    tracing::info!(
        event = SessionEvent::GatewayStopped.as_str(),
        "gateway stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to listen for SIGTERM; Ctrl+C only");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
