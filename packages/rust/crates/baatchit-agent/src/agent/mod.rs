//! One-turn agent loop: user message -> LLM (+ web_search tool) -> tool answers -> repeat,
//! bounded by `max_attempts`, with a single no-tools fallback on completion failure.

mod dispatch;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::AgentConfig;
use crate::error::ChatError;
use crate::llm::CompletionBackend;
use crate::observability::{SessionEvent, short_session_id};
use crate::search::SearchBackend;
use crate::session::{ChatMessage, Session, SessionGate, SessionStore, SessionStoreStats};
use crate::tools::{ToolDefinition, declared_tools};

pub use dispatch::SEARCH_UNAVAILABLE_TEXT;

/// Final answer used when the attempt budget runs out.
pub const APOLOGY_TEXT: &str =
    "I'm sorry, I'm having trouble processing your request right now. Please try again later.";

/// Validation message for a missing or blank user message.
pub const MESSAGE_REQUIRED_TEXT: &str = "Message is required";

/// How a successful turn terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnTerminal {
    /// The model produced an answer without requesting tools.
    Final,
    /// A completion call failed and the no-tools retry answered.
    Fallback,
    /// Every attempt requested tools; the fixed apology was returned.
    Exhausted,
}

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub session_id: String,
    /// Stored transcript length, system message excluded.
    pub conversation_length: usize,
    /// Registered capabilities invoked during this turn.
    pub tools_used: Vec<String>,
    /// Completion calls made, fallback included; never above `max_attempts`.
    pub attempts: u32,
    pub terminal: TurnTerminal,
}

/// Orchestrates completion and search for every session held in the store.
pub struct Agent {
    config: AgentConfig,
    store: SessionStore,
    gate: SessionGate,
    llm: Arc<dyn CompletionBackend>,
    search: Arc<dyn SearchBackend>,
    tools: Vec<ToolDefinition>,
}

impl Agent {
    pub fn new(
        config: AgentConfig,
        store: SessionStore,
        llm: Arc<dyn CompletionBackend>,
        search: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            config,
            store,
            gate: SessionGate::new(),
            llm,
            search,
            tools: declared_tools(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Session ids with a turn in flight or waiting for one.
    pub fn in_flight_sessions(&self) -> usize {
        self.gate.active_sessions()
    }

    pub async fn stats(&self) -> SessionStoreStats {
        self.store.stats().await
    }

    /// Forget a session explicitly. Waits for an in-flight turn on the same id.
    pub async fn reset_session(&self, session_id: &str) -> bool {
        let _guard = self.gate.acquire(session_id).await;
        self.store.reset(session_id).await
    }

    /// Run one user turn against `session_id` (or a fresh session).
    ///
    /// Turns for the same id are serialized. The stored transcript is only
    /// replaced when the turn succeeds.
    pub async fn run_turn(
        &self,
        session_id: Option<&str>,
        user_message: &str,
    ) -> Result<TurnOutcome, ChatError> {
        if user_message.trim().is_empty() {
            return Err(ChatError::Validation(MESSAGE_REQUIRED_TEXT.to_string()));
        }
        let requested = session_id.map(str::trim).filter(|id| !id.is_empty());
        let _guard = match requested {
            Some(id) => Some(self.gate.acquire(id).await),
            None => None,
        };

        let (session_id, mut session) = self.store.get_or_create(requested).await;
        tracing::info!(
            event = SessionEvent::TurnStarted.as_str(),
            session_id = %session_id,
            history = session.conversation_length(),
            "turn started"
        );

        let user_index = session.messages.len();
        session.push(ChatMessage::user(user_message));

        match self.drive(&session_id, &mut session, user_index).await {
            Ok(progress) => {
                let conversation_length = session.conversation_length();
                self.store.touch_and_save(&session_id, session).await;
                tracing::info!(
                    event = SessionEvent::TurnCompleted.as_str(),
                    session_id = %session_id,
                    short_id = short_session_id(&session_id),
                    attempts = progress.attempts,
                    terminal = ?progress.terminal,
                    tools_used = ?progress.tools_used,
                    conversation_length,
                    reply_preview = %preview(&progress.reply),
                    "turn completed"
                );
                Ok(TurnOutcome {
                    reply: progress.reply,
                    session_id,
                    conversation_length,
                    tools_used: progress.tools_used,
                    attempts: progress.attempts,
                    terminal: progress.terminal,
                })
            }
            Err(error) => {
                tracing::error!(
                    event = SessionEvent::TurnFailed.as_str(),
                    session_id = %session_id,
                    error = %error,
                    "turn failed; stored transcript left unchanged"
                );
                Err(error)
            }
        }
    }

    /// [`Agent::run_turn`] under a wall-clock budget. An elapsed budget drops the turn,
    /// leaves the stored transcript untouched and reports `ServiceUnavailable`.
    pub async fn run_turn_within(
        &self,
        session_id: Option<&str>,
        user_message: &str,
        budget: Duration,
    ) -> Result<TurnOutcome, ChatError> {
        match tokio::time::timeout(budget, self.run_turn(session_id, user_message)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    event = SessionEvent::TurnTimedOut.as_str(),
                    session_id = session_id.unwrap_or("<new>"),
                    budget_secs = budget.as_secs(),
                    "turn exceeded its budget"
                );
                Err(ChatError::ServiceUnavailable(format!(
                    "turn timed out after {}s",
                    budget.as_secs()
                )))
            }
        }
    }

    async fn drive(
        &self,
        session_id: &str,
        session: &mut Session,
        user_index: usize,
    ) -> Result<Progress, ChatError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut progress = Progress::default();

        while progress.attempts < max_attempts {
            progress.attempts += 1;
            let turn = match self
                .llm
                .complete(&session.messages, Some(self.tools.as_slice()))
                .await
            {
                Ok(turn) => turn,
                Err(error) if progress.attempts >= max_attempts => {
                    tracing::warn!(
                        event = SessionEvent::CompletionFailed.as_str(),
                        session_id,
                        attempt = progress.attempts,
                        error = %error,
                        "completion failed on the last attempt; no budget left for a retry"
                    );
                    break;
                }
                Err(error) => {
                    tracing::warn!(
                        event = SessionEvent::CompletionFailed.as_str(),
                        session_id,
                        attempt = progress.attempts,
                        error = %error,
                        "completion failed; retrying once without tools"
                    );
                    return self
                        .fallback(session_id, session, user_index, progress)
                        .await;
                }
            };

            session.push(turn.to_message());
            if turn.is_final() {
                progress.reply = turn.content.unwrap_or_default();
                progress.terminal = TurnTerminal::Final;
                return Ok(progress);
            }

            let report =
                dispatch::dispatch_invocations(self.search.as_ref(), session_id, turn.invocations())
                    .await;
            for kind in report.used {
                let name = kind.as_str().to_string();
                if !progress.tools_used.contains(&name) {
                    progress.tools_used.push(name);
                }
            }
            for message in report.messages {
                session.push(message);
            }
        }

        tracing::warn!(
            event = SessionEvent::AttemptsExhausted.as_str(),
            session_id,
            attempts = progress.attempts,
            "attempt budget exhausted; answering with apology"
        );
        session.messages.truncate(user_index + 1);
        session.push(ChatMessage::assistant(APOLOGY_TEXT));
        progress.reply = APOLOGY_TEXT.to_string();
        progress.terminal = TurnTerminal::Exhausted;
        Ok(progress)
    }

    async fn fallback(
        &self,
        session_id: &str,
        session: &mut Session,
        user_index: usize,
        mut progress: Progress,
    ) -> Result<Progress, ChatError> {
        drop_trailing_assistant_exchange(&mut session.messages, user_index + 1);
        progress.attempts += 1;
        match self.llm.complete(&session.messages, None).await {
            Ok(turn) => {
                let reply = turn.content.unwrap_or_default();
                session.push(ChatMessage::assistant(reply.clone()));
                tracing::info!(
                    event = SessionEvent::FallbackSucceeded.as_str(),
                    session_id,
                    attempts = progress.attempts,
                    "fallback without tools succeeded"
                );
                progress.reply = reply;
                progress.terminal = TurnTerminal::Fallback;
                Ok(progress)
            }
            Err(error) => {
                tracing::error!(
                    event = SessionEvent::FallbackFailed.as_str(),
                    session_id,
                    attempts = progress.attempts,
                    error = %error,
                    "fallback without tools failed"
                );
                Err(ChatError::ServiceUnavailable(error.to_string()))
            }
        }
    }
}

#[derive(Debug)]
struct Progress {
    reply: String,
    tools_used: Vec<String>,
    attempts: u32,
    terminal: TurnTerminal,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            reply: String::new(),
            tools_used: Vec::new(),
            attempts: 0,
            terminal: TurnTerminal::Exhausted,
        }
    }
}

/// Remove the latest assistant message at or after `floor` together with the tool
/// answers that follow it. Nothing before `floor` is touched.
fn drop_trailing_assistant_exchange(messages: &mut Vec<ChatMessage>, floor: usize) {
    if let Some(index) = messages
        .iter()
        .rposition(ChatMessage::is_assistant)
        .filter(|index| *index >= floor)
    {
        messages.truncate(index);
    }
}

fn preview(reply: &str) -> String {
    let mut out: String = reply.chars().take(100).collect();
    if reply.chars().nth(100).is_some() {
        out.push_str("...");
    }
    out
}
